use lazy_static::lazy_static;

use crate::providers::Model;

lazy_static! {
    // Models with controlled generation (responseSchema) support. The model listing
    // route also returns embedding and imagen models, so the chat models are kept here.
    pub(super) static ref GEMINI_MODELS: [Model; 4] = [
        Model {
            id: "gemini-2.5-flash".to_string(),
            context_length: Some(1048576),
        },
        Model {
            id: "gemini-2.5-flash-lite".to_string(),
            context_length: Some(1048576),
        },
        Model {
            id: "gemini-2.5-pro".to_string(),
            context_length: Some(1048576),
        },
        Model {
            id: "gemini-2.0-flash".to_string(),
            context_length: Some(1048576),
        },
    ];

    pub(super) static ref DEFAULT_MODEL: &'static Model = &GEMINI_MODELS[0];
}
