mod user_story;

pub use user_story::{USER_STORY_PROMPT, user_story};
