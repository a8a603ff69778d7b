//! Region selection and rights content
//!
//! - `states`: the 50 U.S. states
//! - `content`: card types and the bundled English/Spanish content
//! - `generator`: remote content generation (chat completions)
//! - `selector`: region -> card, with fallback to bundled content

mod content;
mod generator;
mod selector;
mod states;

pub use content::{
    default_content, default_scripts, default_sections, Language, RightsCard, RightsContent,
    RightsSection, Script,
};
pub use generator::{
    parse_generated, ChatCompletionGenerator, ChatCompletionSettings, ContentGenerator,
};
pub use selector::ContentSelector;
pub use states::{all_states, find_state, search_states, StateInfo, US_STATES};
