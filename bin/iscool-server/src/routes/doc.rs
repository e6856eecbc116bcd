use utoipa::OpenApi;

use crate::routes::chat::ChatApi;
use crate::routes::health::HealthApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "IsCool GPT API (Gemini)",
    description = "Study assistant chat gateway backed by the Google Gemini API",
    version = "1.0.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(HealthApi::openapi());
    root.merge(ChatApi::openapi());
    root
}
