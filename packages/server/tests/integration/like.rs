use sea_orm::EntityTrait;
use serde_json::json;

use viridian_server::entity::like;

use crate::common::{TestApp, routes};

async fn setup(app: &TestApp) -> (String, String, i32) {
    let artist = app
        .create_authenticated_user("artist@example.com", "securepass")
        .await;
    let fan = app
        .create_authenticated_user("fan@example.com", "securepass")
        .await;
    let piece = app.create_artpiece(&artist, "Likeable", 0).await;
    (artist, fan, piece)
}

#[tokio::test]
async fn a_user_can_like_someone_elses_piece() {
    let app = TestApp::spawn().await;
    let (_artist, fan, piece) = setup(&app).await;

    let res = app
        .post_with_token(routes::LIKES, &json!({"artpiece_id": piece}), &fan)
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["artpiece_id"], piece);
}

#[tokio::test]
async fn liking_the_same_piece_twice_is_rejected() {
    let app = TestApp::spawn().await;
    let (_artist, fan, piece) = setup(&app).await;
    let body = json!({"artpiece_id": piece});

    let first = app.post_with_token(routes::LIKES, &body, &fan).await;
    assert_eq!(first.status, 201);

    let second = app.post_with_token(routes::LIKES, &body, &fan).await;
    assert_eq!(second.status, 400);
    assert!(second.body["message"].as_str().unwrap().contains("duplicate"));

    let count = like::Entity::find().all(&app.db).await.unwrap().len();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn liking_your_own_piece_is_rejected() {
    let app = TestApp::spawn().await;
    let (artist, _fan, piece) = setup(&app).await;

    let res = app
        .post_with_token(routes::LIKES, &json!({"artpiece_id": piece}), &artist)
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn liking_a_missing_piece_is_404() {
    let app = TestApp::spawn().await;
    let fan = app
        .create_authenticated_user("fan@example.com", "securepass")
        .await;

    let res = app
        .post_with_token(routes::LIKES, &json!({"artpiece_id": 424242}), &fan)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn the_listing_can_be_filtered_by_piece() {
    let app = TestApp::spawn().await;
    let (artist, fan, piece) = setup(&app).await;
    let other = app.create_artpiece(&artist, "Also likeable", 0).await;
    app.post_with_token(routes::LIKES, &json!({"artpiece_id": piece}), &fan)
        .await;
    app.post_with_token(routes::LIKES, &json!({"artpiece_id": other}), &fan)
        .await;

    let all = app.get_with_token(routes::LIKES, &fan).await;
    assert_eq!(all.body.as_array().unwrap().len(), 2);

    let filtered = app
        .get_with_token(&format!("{}?artpiece_id={piece}", routes::LIKES), &fan)
        .await;
    let items = filtered.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["artpiece_id"], piece);
}

#[tokio::test]
async fn the_listing_is_readable_without_a_token() {
    let app = TestApp::spawn().await;
    let (_, fan, piece) = setup(&app).await;
    app.post_with_token(routes::LIKES, &json!({"artpiece_id": piece}), &fan)
        .await;

    let res = app.get_without_token(routes::LIKES).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_likes_owner_can_remove_it() {
    let app = TestApp::spawn().await;
    let (artist, fan, piece) = setup(&app).await;

    let created = app
        .post_with_token(routes::LIKES, &json!({"artpiece_id": piece}), &fan)
        .await;
    let like_id = created.id();

    let res = app.delete_with_token(&routes::like(like_id), &artist).await;
    assert_eq!(res.status, 403);

    let res = app.delete_with_token(&routes::like(like_id), &fan).await;
    assert_eq!(res.status, 204);
    assert!(
        like::Entity::find_by_id(like_id)
            .one(&app.db)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn a_piece_can_be_liked_again_after_unliking() {
    let app = TestApp::spawn().await;
    let (_artist, fan, piece) = setup(&app).await;
    let body = json!({"artpiece_id": piece});

    let first = app.post_with_token(routes::LIKES, &body, &fan).await;
    app.delete_with_token(&routes::like(first.id()), &fan).await;

    let again = app.post_with_token(routes::LIKES, &body, &fan).await;
    assert_eq!(again.status, 201);
}
