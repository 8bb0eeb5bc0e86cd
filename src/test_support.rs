use crate::tracker::{Blocker, Story, StoryState};

pub fn story(id: u64, name: &str, state: StoryState) -> Story {
    Story {
        id,
        project_id: 9,
        name: name.to_owned(),
        url: format!("https://www.pivotaltracker.com/story/show/{id}"),
        current_state: state,
        blockers: None,
        labels: None,
    }
}

pub fn story_with_blockers(
    id: u64,
    name: &str,
    state: StoryState,
    blocker_descriptions: &[&str],
) -> Story {
    let blockers = blocker_descriptions
        .iter()
        .enumerate()
        .map(|(index, description)| Blocker {
            id: id * 10 + index as u64,
            story_id: id,
            description: (*description).to_owned(),
        })
        .collect();

    Story {
        blockers: Some(blockers),
        ..story(id, name, state)
    }
}
