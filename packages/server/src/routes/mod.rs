use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/profiles", profile_routes())
        .nest("/artpieces", artpiece_routes())
        .nest("/collections", collection_routes())
        .nest("/enquiries", enquiry_routes())
        .nest("/likes", like_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn profile_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::profile::list_profiles))
        .routes(routes!(
            handlers::profile::get_profile,
            handlers::profile::update_profile
        ))
        .routes(routes!(handlers::profile::update_profile_image))
        .layer(handlers::profile::image_body_limit())
}

fn artpiece_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::artpiece::list_artpieces,
            handlers::artpiece::create_artpiece
        ))
        .routes(routes!(handlers::artpiece::trending_artpieces))
        .routes(routes!(
            handlers::artpiece::get_artpiece,
            handlers::artpiece::update_artpiece,
            handlers::artpiece::delete_artpiece
        ))
        .layer(handlers::artpiece::upload_body_limit())
}

fn collection_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::collection::list_collections,
            handlers::collection::create_collection
        ))
        .routes(routes!(
            handlers::collection::get_collection,
            handlers::collection::update_collection,
            handlers::collection::delete_collection
        ))
        .routes(routes!(handlers::collection::update_artpieces))
}

fn enquiry_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::enquiry::list_enquiries,
            handlers::enquiry::create_enquiry
        ))
        .routes(routes!(
            handlers::enquiry::get_enquiry,
            handlers::enquiry::respond_enquiry,
            handlers::enquiry::withdraw_enquiry
        ))
}

fn like_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::like::list_likes,
            handlers::like::create_like
        ))
        .routes(routes!(handlers::like::delete_like))
}
