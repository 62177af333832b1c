use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

use viridian_server::entity::{artpiece, artpiece_hashtag, enquiry, hashtag, like};

use crate::common::{TestApp, routes};

async fn tag_names(app: &TestApp) -> Vec<String> {
    let mut names: Vec<String> = hashtag::Entity::find()
        .all(&app.db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();
    names
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn upload_creates_the_piece_and_its_hashtags() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;

        let form = TestApp::artpiece_form("Sunset", 1, Some("#oil and #sunset"));
        let res = app
            .multipart_with_token(reqwest::Method::POST, routes::ARTPIECES, form, &token)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["title"], "Sunset");
        assert_eq!(res.body["for_sale"], 1);
        assert_eq!(res.body["hashtags"], json!(["oil", "sunset"]));
        assert!(res.body["image_url"].as_str().unwrap().starts_with("http://"));

        assert_eq!(tag_names(&app).await, vec!["oil", "sunset"]);
    }

    #[tokio::test]
    async fn two_pieces_can_share_a_hashtag_without_duplicating_it() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;

        app.create_artpiece_with_tags(&token, "First", 0, Some("#shared"))
            .await;
        app.create_artpiece_with_tags(&token, "Second", 0, Some("#shared"))
            .await;

        assert_eq!(tag_names(&app).await, vec!["shared"]);
        let assoc_count = artpiece_hashtag::Entity::find()
            .all(&app.db)
            .await
            .unwrap()
            .len();
        assert_eq!(assoc_count, 2);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        app.create_artpiece(&token, "Sunset", 0).await;

        let form = TestApp::artpiece_form("Sunset", 0, None);
        let res = app
            .multipart_with_token(reqwest::Method::POST, routes::ARTPIECES, form, &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn hashtag_text_without_any_token_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;

        let form = TestApp::artpiece_form("Sunset", 0, Some("no tags at all"));
        let res = app
            .multipart_with_token(reqwest::Method::POST, routes::ARTPIECES, form, &token)
            .await;
        assert_eq!(res.status, 400);

        // Nothing was persisted.
        assert!(artpiece::Entity::find().all(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_image_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;

        let form = reqwest::multipart::Form::new().text("title", "No image");
        let res = app
            .multipart_with_token(reqwest::Method::POST, routes::ARTPIECES, form, &token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn out_of_range_medium_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;

        let form = TestApp::artpiece_form("Sunset", 0, None).text("art_medium", "12");
        let res = app
            .multipart_with_token(reqwest::Method::POST, routes::ARTPIECES, form, &token)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn owner_filter_narrows_the_listing() {
        let app = TestApp::spawn().await;
        let alice = app
            .create_authenticated_user("alice@example.com", "securepass")
            .await;
        let bob = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;

        app.create_artpiece(&alice, "Alice piece", 0).await;
        app.create_artpiece(&bob, "Bob piece", 0).await;

        let all = app.get_with_token(routes::ARTPIECES, &alice).await;
        assert_eq!(all.body.as_array().unwrap().len(), 2);

        let me = app.get_with_token(routes::ME, &bob).await;
        let bob_id = me.body["id"].as_i64().unwrap();
        let filtered = app
            .get_with_token(&format!("{}?owner={bob_id}", routes::ARTPIECES), &alice)
            .await;
        let items = filtered.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Bob piece");
    }

    #[tokio::test]
    async fn missing_piece_is_404() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("alice@example.com", "securepass")
            .await;

        let res = app.get_with_token(&routes::artpiece(424242), &token).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn pieces_can_be_browsed_without_logging_in() {
        let app = TestApp::spawn().await;
        let artist = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let piece = app.create_artpiece(&artist, "Open gallery", 0).await;

        let listing = app.get_without_token(routes::ARTPIECES).await;
        assert_eq!(listing.status, 200);
        assert_eq!(listing.body.as_array().unwrap().len(), 1);

        let detail = app.get_without_token(&routes::artpiece(piece)).await;
        assert_eq!(detail.status, 200);
        assert_eq!(detail.body["title"], "Open gallery");

        let trending = app.get_without_token(routes::TRENDING).await;
        assert_eq!(trending.status, 200);
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    async fn retagging_replaces_the_set_and_purges_orphans() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let id = app
            .create_artpiece_with_tags(&token, "Sunset", 0, Some("#old_tag #kept"))
            .await;

        let form = reqwest::multipart::Form::new().text("hashtags", "#kept #fresh");
        let res = app
            .multipart_with_token(reqwest::Method::PUT, &routes::artpiece(id), form, &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["hashtags"], json!(["fresh", "kept"]));

        // old_tag lost its last reference and is gone from the store.
        assert_eq!(tag_names(&app).await, vec!["fresh", "kept"]);
    }

    #[tokio::test]
    async fn a_tag_still_used_elsewhere_survives_retagging() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let first = app
            .create_artpiece_with_tags(&token, "First", 0, Some("#shared"))
            .await;
        app.create_artpiece_with_tags(&token, "Second", 0, Some("#shared"))
            .await;

        let form = reqwest::multipart::Form::new().text("hashtags", "#solo");
        app.multipart_with_token(reqwest::Method::PUT, &routes::artpiece(first), form, &token)
            .await;

        assert_eq!(tag_names(&app).await, vec!["shared", "solo"]);
    }

    #[tokio::test]
    async fn update_without_hashtags_field_leaves_tags_alone() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let id = app
            .create_artpiece_with_tags(&token, "Sunset", 0, Some("#keepme"))
            .await;

        let form = reqwest::multipart::Form::new().text("description", "now with more orange");
        let res = app
            .multipart_with_token(reqwest::Method::PUT, &routes::artpiece(id), form, &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["hashtags"], json!(["keepme"]));
        assert_eq!(res.body["description"], "now with more orange");
    }

    #[tokio::test]
    async fn replacing_the_image_destroys_the_old_file() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let id = app.create_artpiece(&token, "Sunset", 0).await;

        let old = artpiece::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap()
            .image_public_id;
        assert!(app.image_path(&old).exists());

        let form = reqwest::multipart::Form::new().part(
            "image",
            reqwest::multipart::Part::bytes(b"repainted".to_vec())
                .file_name("v2.png")
                .mime_str("image/png")
                .unwrap(),
        );
        let res = app
            .multipart_with_token(reqwest::Method::PUT, &routes::artpiece(id), form, &token)
            .await;
        assert_eq!(res.status, 200);
        assert!(!app.image_path(&old).exists());
    }

    #[tokio::test]
    async fn only_the_owner_can_update() {
        let app = TestApp::spawn().await;
        let alice = app
            .create_authenticated_user("alice@example.com", "securepass")
            .await;
        let bob = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let id = app.create_artpiece(&alice, "Alice piece", 0).await;

        let form = reqwest::multipart::Form::new().text("title", "Stolen");
        let res = app
            .multipart_with_token(reqwest::Method::PUT, &routes::artpiece(id), form, &bob)
            .await;
        assert_eq!(res.status, 403);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_likes_tags_and_the_image_file() {
        let app = TestApp::spawn().await;
        let artist = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let fan = app
            .create_authenticated_user("fan@example.com", "securepass")
            .await;
        let id = app
            .create_artpiece_with_tags(&artist, "Sunset", 1, Some("#doomed"))
            .await;
        app.post_with_token(routes::LIKES, &json!({"artpiece_id": id}), &fan)
            .await;

        let public_id = artpiece::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap()
            .image_public_id;

        let res = app.delete_with_token(&routes::artpiece(id), &artist).await;
        assert_eq!(res.status, 204);

        assert!(artpiece::Entity::find_by_id(id).one(&app.db).await.unwrap().is_none());
        assert!(like::Entity::find().all(&app.db).await.unwrap().is_empty());
        assert!(tag_names(&app).await.is_empty());
        assert!(!app.image_path(&public_id).exists());
    }

    #[tokio::test]
    async fn delete_detaches_enquiries_instead_of_deleting_them() {
        let app = TestApp::spawn().await;
        let artist = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let buyer = app
            .create_authenticated_user("buyer@example.com", "securepass")
            .await;
        let id = app.create_artpiece(&artist, "Sunset", 1).await;
        let enquiry_id = app.create_enquiry(&buyer, id).await;

        app.delete_with_token(&routes::artpiece(id), &artist).await;

        let row = enquiry::Entity::find_by_id(enquiry_id)
            .one(&app.db)
            .await
            .unwrap()
            .expect("buyer keeps their enquiry record");
        assert_eq!(row.artpiece_id, None);
        assert!(row.buyer_id.is_some());
    }

    #[tokio::test]
    async fn a_row_with_neither_party_left_is_deleted_with_the_piece() {
        let app = TestApp::spawn().await;
        let artist = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let buyer = app
            .create_authenticated_user("buyer@example.com", "securepass")
            .await;
        let id = app.create_artpiece(&artist, "Sunset", 1).await;
        let enquiry_id = app.create_enquiry(&buyer, id).await;

        // Buyer withdraws first, then the piece goes away.
        app.delete_with_token(&routes::enquiry(enquiry_id), &buyer)
            .await;
        app.delete_with_token(&routes::artpiece(id), &artist).await;

        assert!(
            enquiry::Entity::find_by_id(enquiry_id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn only_the_owner_can_delete() {
        let app = TestApp::spawn().await;
        let alice = app
            .create_authenticated_user("alice@example.com", "securepass")
            .await;
        let bob = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let id = app.create_artpiece(&alice, "Alice piece", 0).await;

        let res = app.delete_with_token(&routes::artpiece(id), &bob).await;
        assert_eq!(res.status, 403);
        assert!(
            artpiece::Entity::find_by_id(id)
                .one(&app.db)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn shared_tags_survive_a_piece_deletion() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let first = app
            .create_artpiece_with_tags(&token, "First", 0, Some("#shared #solo"))
            .await;
        app.create_artpiece_with_tags(&token, "Second", 0, Some("#shared"))
            .await;

        app.delete_with_token(&routes::artpiece(first), &token).await;

        assert_eq!(tag_names(&app).await, vec!["shared"]);
    }
}
