/// Instructions placed ahead of the requirement text. The requirement is
/// appended verbatim after the trailing `Requirement:` label.
pub const USER_STORY_PROMPT: &str = "
Create a user story from the provided requirement following the template below:

Title
Short, descriptive name (often starting with a role).

As a [type of user]
I want [goal/desired action]
So that [benefit/value]

Acceptance Criteria (AC):
Given [initial context]
When [action occurs]
Then [outcome(s)]

Additional Details (Optional):


Requirement:

";

pub fn user_story(requirement: &str) -> String {
    let mut prompt = String::with_capacity(USER_STORY_PROMPT.len() + requirement.len());
    prompt.push_str(USER_STORY_PROMPT);
    prompt.push_str(requirement);
    prompt
}
