use lazy_static::lazy_static;

use crate::providers::Model;

lazy_static! {
    // The OpenAI API does not include an API route to list their active chat models.
    // Only models which support structured outputs (json_schema response formats)
    // are listed here.
    pub(super) static ref OPENAI_MODELS: [Model; 4] = [
        Model {
            id: "gpt-4o-mini".to_string(),
            context_length: Some(128000),
        },
        Model {
            id: "gpt-4o".to_string(),
            context_length: Some(128000),
        },
        Model {
            id: "gpt-4.1-mini".to_string(),
            context_length: Some(1047576),
        },
        Model {
            id: "gpt-4.1".to_string(),
            context_length: Some(1047576),
        },
    ];

    // The cheapest model is plenty for a few lines of banter.
    pub(super) static ref DEFAULT_MODEL: &'static Model = &OPENAI_MODELS[0];
}
