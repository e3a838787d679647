mod prompts;
mod score;
mod validator;

pub use self::{
    prompts::{improvement_messages, validation_messages},
    score::{extract_score, DEFAULT_SCORE, RATING_MARKER},
    validator::{ValidationOutcome, Validator},
};
