use utoipa::OpenApi;

use super::handlers::{HealthResponse, ReadyResponse};
use crate::console::{Console, ConsoleInput};

#[derive(OpenApi)]
#[openapi(
    info(title = "Consoles API", description = "CRUD over a catalogue of game consoles"),
    paths(
        crate::api::handlers::list_consoles,
        crate::api::handlers::create_console,
        crate::api::handlers::get_console,
        crate::api::handlers::update_console,
        crate::api::handlers::delete_console,
        crate::api::handlers::health,
        crate::api::handlers::ready,
    ),
    components(schemas(Console, ConsoleInput, HealthResponse, ReadyResponse)),
    tags(
        (name = "consoles"),
        (name = "health")
    )
)]
pub struct ApiDoc;
