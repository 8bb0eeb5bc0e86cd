use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::tracker::{Story, StoryState};

pub mod mermaid;

/// Diagram color classes, keyed to the Tracker story-state help page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorClass {
    Grey,
    Blue,
    Yellow,
    Green,
    Red,
}

impl ColorClass {
    pub fn for_state(state: StoryState) -> Self {
        match state {
            StoryState::Accepted | StoryState::Delivered | StoryState::Finished => Self::Green,
            StoryState::Started => Self::Blue,
            StoryState::Rejected => Self::Red,
            StoryState::Planned | StoryState::Unstarted | StoryState::Unscheduled => Self::Grey,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "GREY",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Red => "RED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoryNode {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub state: StoryState,
    pub class: ColorClass,
}

/// Directed dependency: the blocking story points at the story it blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockerEdge {
    pub blocking: u64,
    pub blocked: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryGraph {
    pub nodes: Vec<StoryNode>,
    pub edges: Vec<BlockerEdge>,
}

impl StoryGraph {
    pub fn contains_story(&self, story_id: u64) -> bool {
        self.nodes.iter().any(|node| node.id == story_id)
    }
}

pub fn build_story_graph(stories: &[Story]) -> StoryGraph {
    let mut nodes = stories
        .iter()
        .map(|story| StoryNode {
            id: story.id,
            name: story.name.clone(),
            url: story.url.clone(),
            state: story.current_state,
            class: ColorClass::for_state(story.current_state),
        })
        .collect::<Vec<_>>();
    nodes.sort();
    nodes.dedup_by_key(|node| node.id);

    let mut edges = BTreeSet::new();
    for story in stories {
        let Some(blockers) = &story.blockers else {
            continue;
        };
        for blocker in blockers {
            for blocking in blocking_story_ids(&blocker.description) {
                edges.insert(BlockerEdge {
                    blocking,
                    blocked: story.id,
                });
            }
        }
    }

    StoryGraph {
        nodes,
        edges: edges.into_iter().collect(),
    }
}

static SHORT_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9]+)").expect("short tag pattern should compile"));
static STORY_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://www\.pivotaltracker\.com/story/show/([0-9]+)")
        .expect("story url pattern should compile")
});
static PROJECT_STORY_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://www\.pivotaltracker\.com/n/projects/[0-9]+/stories/([0-9]+)")
        .expect("project story url pattern should compile")
});

/// Story ids referenced by a blocker description. Tracker users write these
/// as `#123` short tags, story-show URLs, or project-scoped story URLs.
pub fn blocking_story_ids(description: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    for pattern in [&SHORT_TAG_REGEX, &STORY_URL_REGEX, &PROJECT_STORY_URL_REGEX] {
        for capture in pattern.captures_iter(description) {
            if let Some(id) = capture.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) {
                ids.push(id);
            }
        }
    }
    ids
}
