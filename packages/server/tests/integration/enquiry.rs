use sea_orm::EntityTrait;
use serde_json::json;

use viridian_server::entity::enquiry;

use crate::common::{TestApp, routes};

/// artist + buyer + a for-sale piece.
async fn setup(app: &TestApp) -> (String, String, i32) {
    let artist = app
        .create_authenticated_user("artist@example.com", "securepass")
        .await;
    let buyer = app
        .create_authenticated_user("buyer@example.com", "securepass")
        .await;
    let piece = app.create_artpiece(&artist, "For sale", 1).await;
    (artist, buyer, piece)
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn an_enquiry_starts_pending_and_unchecked() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;

        let res = app
            .post_with_token(
                routes::ENQUIRIES,
                &json!({"artpiece_id": piece, "message": "Is this available?"}),
                &buyer,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], 0);
        assert_eq!(res.body["buyer_has_checked"], false);
        assert_eq!(res.body["artist_has_checked"], false);
        assert_eq!(res.body["response_message"], json!(null));
    }

    #[tokio::test]
    async fn cannot_enquire_about_a_piece_not_for_sale() {
        let app = TestApp::spawn().await;
        let artist = app
            .create_authenticated_user("artist@example.com", "securepass")
            .await;
        let buyer = app
            .create_authenticated_user("buyer@example.com", "securepass")
            .await;
        let piece = app.create_artpiece(&artist, "Not for sale", 0).await;

        let res = app
            .post_with_token(
                routes::ENQUIRIES,
                &json!({"artpiece_id": piece, "message": "Please?"}),
                &buyer,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_enquire_about_your_own_piece() {
        let app = TestApp::spawn().await;
        let (artist, _buyer, piece) = setup(&app).await;

        let res = app
            .post_with_token(
                routes::ENQUIRIES,
                &json!({"artpiece_id": piece, "message": "Buying from myself"}),
                &artist,
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn a_missing_piece_is_404() {
        let app = TestApp::spawn().await;
        let buyer = app
            .create_authenticated_user("buyer@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                routes::ENQUIRIES,
                &json!({"artpiece_id": 424242, "message": "Hello?"}),
                &buyer,
            )
            .await;
        assert_eq!(res.status, 404);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn both_parties_see_the_enquiry_and_outsiders_do_not() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let outsider = app
            .create_authenticated_user("outsider@example.com", "securepass")
            .await;
        app.create_enquiry(&buyer, piece).await;

        let as_buyer = app.get_with_token(routes::ENQUIRIES, &buyer).await;
        assert_eq!(as_buyer.body.as_array().unwrap().len(), 1);

        let as_artist = app.get_with_token(routes::ENQUIRIES, &artist).await;
        assert_eq!(as_artist.body.as_array().unwrap().len(), 1);

        let as_outsider = app.get_with_token(routes::ENQUIRIES, &outsider).await;
        assert!(as_outsider.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn outsiders_cannot_fetch_an_enquiry_directly() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;
        let outsider = app
            .create_authenticated_user("outsider@example.com", "securepass")
            .await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app.get_with_token(&routes::enquiry(id), &outsider).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn fetching_marks_only_the_callers_side_as_checked() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app.get_with_token(&routes::enquiry(id), &buyer).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["buyer_has_checked"], true);
        assert_eq!(res.body["artist_has_checked"], false);

        let row = enquiry::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(row.buyer_has_checked);
        assert!(!row.artist_has_checked);
    }
}

mod responding {
    use super::*;

    #[tokio::test]
    async fn the_artist_can_accept_and_the_buyer_then_sees_their_email() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app
            .put_with_token(
                &routes::enquiry(id),
                &json!({"status": 1, "response_message": "Yours! Email me."}),
                &artist,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], 1);
        // The response is fresh news for the buyer.
        assert_eq!(res.body["buyer_has_checked"], false);
        assert_eq!(res.body["artist_has_checked"], true);

        let as_buyer = app.get_with_token(&routes::enquiry(id), &buyer).await;
        assert_eq!(as_buyer.body["artist_email"], "artist@example.com");
        assert_eq!(as_buyer.body["response_message"], "Yours! Email me.");

        // Any accepted retrieve carries the email, the artist's own included.
        let as_artist = app.get_with_token(&routes::enquiry(id), &artist).await;
        assert_eq!(as_artist.body["artist_email"], "artist@example.com");
    }

    #[tokio::test]
    async fn the_artist_email_stays_hidden_until_acceptance() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app.get_with_token(&routes::enquiry(id), &buyer).await;
        assert_eq!(res.body["artist_email"], json!(null));
    }

    #[tokio::test]
    async fn the_buyer_cannot_respond() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app
            .put_with_token(&routes::enquiry(id), &json!({"status": 1}), &buyer)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn a_resolved_enquiry_cannot_be_responded_to_again() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        app.put_with_token(&routes::enquiry(id), &json!({"status": 2}), &artist)
            .await;
        let res = app
            .put_with_token(&routes::enquiry(id), &json!({"status": 1}), &artist)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn pending_is_not_a_valid_response_status() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app
            .put_with_token(&routes::enquiry(id), &json!({"status": 0}), &artist)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod withdrawal {
    use super::*;

    #[tokio::test]
    async fn a_buyer_withdrawal_keeps_the_artists_record() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app.delete_with_token(&routes::enquiry(id), &buyer).await;
        assert_eq!(res.status, 204);

        // The buyer no longer sees it; the artist still does.
        let as_buyer = app.get_with_token(routes::ENQUIRIES, &buyer).await;
        assert!(as_buyer.body.as_array().unwrap().is_empty());

        let as_artist = app.get_with_token(routes::ENQUIRIES, &artist).await;
        assert_eq!(as_artist.body.as_array().unwrap().len(), 1);
        assert_eq!(as_artist.body[0]["buyer_id"], json!(null));
    }

    #[tokio::test]
    async fn the_second_withdrawal_deletes_the_row() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        app.delete_with_token(&routes::enquiry(id), &buyer).await;
        let res = app.delete_with_token(&routes::enquiry(id), &artist).await;
        assert_eq!(res.status, 204);

        assert!(
            enquiry::Entity::find_by_id(id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn an_artist_withdrawal_detaches_the_piece_side() {
        let app = TestApp::spawn().await;
        let (artist, buyer, piece) = setup(&app).await;
        let id = app.create_enquiry(&buyer, piece).await;

        app.delete_with_token(&routes::enquiry(id), &artist).await;

        let row = enquiry::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.artpiece_id, None);

        // Only the buyer still lists it.
        let as_artist = app.get_with_token(routes::ENQUIRIES, &artist).await;
        assert!(as_artist.body.as_array().unwrap().is_empty());
        let as_buyer = app.get_with_token(routes::ENQUIRIES, &buyer).await;
        assert_eq!(as_buyer.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outsiders_cannot_withdraw() {
        let app = TestApp::spawn().await;
        let (_artist, buyer, piece) = setup(&app).await;
        let outsider = app
            .create_authenticated_user("outsider@example.com", "securepass")
            .await;
        let id = app.create_enquiry(&buyer, piece).await;

        let res = app.delete_with_token(&routes::enquiry(id), &outsider).await;
        assert_eq!(res.status, 403);
    }
}
