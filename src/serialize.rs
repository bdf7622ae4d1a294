//! Projection of loaded entity graphs into JSON.
//!
//! Every entity carries default exclusion rules naming the back-edges that
//! must be dropped when it is rendered; callers may add their own rules on
//! top (the list endpoints drop `appearances` entirely). Traversal stops at
//! [`MAX_DEPTH`]: the entity, its neighbours, and their scalar fields.

use serde_json::{Map, Value, json};

use crate::models::{AppearanceNode, EpisodeNode, GuestNode};

/// Level at which only scalar fields are rendered.
pub const MAX_DEPTH: usize = 2;

/// Caller override for list views: no relations at all.
pub const FLAT: &[&str] = &["appearances"];

/// Dotted exclusion paths, e.g. `appearances.episode`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    paths: Vec<String>,
}

impl Rules {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// True when `name` itself is excluded at this level.
    pub fn excludes(&self, name: &str) -> bool {
        self.paths.iter().any(|p| p == name)
    }

    /// Rules that apply inside the relation `name`, with the prefix stripped.
    pub fn nested(&self, name: &str) -> Self {
        Self::new(
            self.paths
                .iter()
                .filter_map(|p| p.strip_prefix(name).and_then(|rest| rest.strip_prefix('.'))),
        )
    }

    pub fn merge(&self, other: &Rules) -> Self {
        Self::new(self.paths.iter().chain(other.paths.iter()).cloned())
    }
}

pub enum Related<'a> {
    One(&'a dyn Project),
    Many(Vec<&'a dyn Project>),
}

pub trait Project {
    fn default_rules(&self) -> Rules;

    fn fields(&self) -> Map<String, Value>;

    /// Loaded relations only. Unloaded ones are omitted rather than fetched.
    fn relations(&self) -> Vec<(&'static str, Related<'_>)>;
}

pub fn to_value(item: &dyn Project, overrides: &Rules) -> Value {
    project_at(item, overrides, 0)
}

fn project_at(item: &dyn Project, rules: &Rules, depth: usize) -> Value {
    let mut out = item.fields();
    if depth >= MAX_DEPTH {
        return Value::Object(out);
    }

    let rules = item.default_rules().merge(rules);
    for (name, related) in item.relations() {
        if rules.excludes(name) {
            continue;
        }
        let inner = rules.nested(name);
        let value = match related {
            Related::One(child) => project_at(child, &inner, depth + 1),
            Related::Many(children) => Value::Array(
                children.into_iter().map(|c| project_at(c, &inner, depth + 1)).collect(),
            ),
        };
        out.insert(name.to_string(), value);
    }

    Value::Object(out)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn appearances(loaded: Option<&[AppearanceNode]>) -> Vec<(&'static str, Related<'_>)> {
    match loaded {
        Some(apps) => {
            vec![("appearances", Related::Many(apps.iter().map(|a| a as &dyn Project).collect()))]
        },
        None => Vec::new(),
    }
}

impl Project for EpisodeNode {
    fn default_rules(&self) -> Rules {
        Rules::new(["appearances.episode"])
    }

    fn fields(&self) -> Map<String, Value> {
        let e = &self.episode;
        object(json!({ "id": e.id, "date": e.date, "number": e.number }))
    }

    fn relations(&self) -> Vec<(&'static str, Related<'_>)> {
        appearances(self.appearances.as_deref())
    }
}

impl Project for GuestNode {
    fn default_rules(&self) -> Rules {
        Rules::new(["appearances.guest"])
    }

    fn fields(&self) -> Map<String, Value> {
        let g = &self.guest;
        object(json!({ "id": g.id, "name": g.name, "occupation": g.occupation }))
    }

    fn relations(&self) -> Vec<(&'static str, Related<'_>)> {
        appearances(self.appearances.as_deref())
    }
}

impl Project for AppearanceNode {
    fn default_rules(&self) -> Rules {
        Rules::new(["episode.appearances", "guest.appearances"])
    }

    fn fields(&self) -> Map<String, Value> {
        let a = &self.appearance;
        object(json!({
            "id": a.id,
            "rating": a.rating,
            "episode_id": a.episode_id,
            "guest_id": a.guest_id,
        }))
    }

    fn relations(&self) -> Vec<(&'static str, Related<'_>)> {
        let mut out = Vec::new();
        if let Some(episode) = &self.episode {
            out.push(("episode", Related::One(episode.as_ref() as &dyn Project)));
        }
        if let Some(guest) = &self.guest {
            out.push(("guest", Related::One(guest.as_ref() as &dyn Project)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{appearance, episode, guest};

    fn episode(id: i32) -> episode::Model {
        episode::Model { id, date: format!("1/1{id}/99"), number: id }
    }

    fn guest(id: i32) -> guest::Model {
        guest::Model { id, name: format!("Guest {id}"), occupation: "actor".to_string() }
    }

    fn appearance(id: i32, episode_id: i32, guest_id: i32) -> appearance::Model {
        appearance::Model { id, rating: 4, episode_id, guest_id }
    }

    /// A fully cyclic graph: the episode's appearances point back at the
    /// episode, and the guest knows about the same appearance.
    fn cyclic_episode() -> EpisodeNode {
        let inner = AppearanceNode::bare(appearance(1, 1, 1));
        let guest = GuestNode { guest: guest(1), appearances: Some(vec![inner.clone()]) };
        let back = EpisodeNode { episode: episode(1), appearances: Some(vec![inner]) };
        EpisodeNode {
            episode: episode(1),
            appearances: Some(vec![AppearanceNode {
                appearance: appearance(1, 1, 1),
                episode: Some(Box::new(back)),
                guest: Some(Box::new(guest)),
            }]),
        }
    }

    #[test]
    fn nested_rules_strip_prefix() {
        let rules = Rules::new(["appearances.episode", "appearances", "guest.appearances"]);
        assert!(rules.excludes("appearances"));
        assert!(!rules.excludes("guest"));
        assert_eq!(rules.nested("appearances"), Rules::new(["episode"]));
        assert_eq!(rules.nested("guest"), Rules::new(["appearances"]));
        assert_eq!(rules.nested("appear"), Rules::none());
    }

    #[test]
    fn merge_deduplicates() {
        let merged = Rules::new(["a", "b.c"]).merge(&Rules::new(["b.c", "d"]));
        assert_eq!(merged, Rules::new(["a", "b.c", "d"]));
    }

    #[test]
    fn single_episode_embeds_guest_without_back_edge() {
        let value = to_value(&cyclic_episode(), &Rules::none());

        let apps = value["appearances"].as_array().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0]["rating"], 4);
        assert!(apps[0].get("episode").is_none());
        assert_eq!(apps[0]["guest"]["name"], "Guest 1");
        assert!(apps[0]["guest"].get("appearances").is_none());
    }

    #[test]
    fn flat_view_has_no_relations() {
        let value = to_value(&cyclic_episode(), &Rules::new(FLAT.iter().copied()));
        assert_eq!(value, json!({ "id": 1, "date": "1/11/99", "number": 1 }));
    }

    #[test]
    fn appearance_embeds_parents_without_their_collections() {
        let node = AppearanceNode {
            appearance: appearance(7, 1, 2),
            episode: Some(Box::new(cyclic_episode())),
            guest: Some(Box::new(GuestNode {
                guest: guest(2),
                appearances: Some(vec![AppearanceNode::bare(appearance(7, 1, 2))]),
            })),
        };

        let value = to_value(&node, &Rules::none());
        assert_eq!(value["id"], 7);
        assert_eq!(value["episode"]["id"], 1);
        assert_eq!(value["guest"]["id"], 2);
        assert!(value["episode"].get("appearances").is_none());
        assert!(value["guest"].get("appearances").is_none());
    }

    #[test]
    fn depth_is_capped_even_without_rules() {
        struct Chain(usize);

        impl Project for Chain {
            fn default_rules(&self) -> Rules {
                Rules::none()
            }

            fn fields(&self) -> Map<String, Value> {
                object(json!({ "level": self.0 }))
            }

            fn relations(&self) -> Vec<(&'static str, Related<'_>)> {
                vec![("next", Related::One(self))]
            }
        }

        let value = to_value(&Chain(0), &Rules::none());
        assert!(value["next"]["next"].is_object());
        assert!(value["next"]["next"].get("next").is_none());
    }

    #[test]
    fn unloaded_relations_are_omitted() {
        let value = to_value(&GuestNode::bare(guest(3)), &Rules::none());
        assert_eq!(value, json!({ "id": 3, "name": "Guest 3", "occupation": "actor" }));
    }
}
