use tidings_types::models::{FeedEntry, FeedRef, OrganizationSummary};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Feed,
    Notification,
}

/// Turns a reason template into display text for one entry.
/// Returning `None` is a soft failure: the caller shows blank text.
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        organization: &OrganizationSummary,
        template: &str,
        kind: TextKind,
        entry: &FeedEntry,
        language: &str,
    ) -> Option<String>;
}

/// Substitutes `{name}` placeholders with data from the entry's references.
///
/// Known placeholders: `actor`, `org`, `users`, `groups`, `articles`,
/// `revision`, `commit`, `lists` and `var:<key>` for key/value references.
/// A placeholder without data fails the whole text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(
        &self,
        organization: &OrganizationSummary,
        template: &str,
        kind: TextKind,
        entry: &FeedEntry,
        language: &str,
    ) -> Option<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                debug!(reason = %entry.reason, ?kind, language, "unterminated placeholder in template");
                return None;
            };

            let name = &after[..end];
            match placeholder(organization, entry, name) {
                Some(value) => out.push_str(&value),
                None => {
                    debug!(reason = %entry.reason, ?kind, language, placeholder = name, "no data for placeholder");
                    return None;
                }
            }

            rest = &after[end + 1..];
        }

        out.push_str(rest);
        Some(out)
    }
}

fn placeholder(organization: &OrganizationSummary, entry: &FeedEntry, name: &str) -> Option<String> {
    if let Some(key) = name.strip_prefix("var:") {
        return entry.refs.iter().find_map(|r| match r {
            FeedRef::KeyValue { key: k, value } if k == key => Some(value.clone()),
            _ => None,
        });
    }

    match name {
        "actor" => Some(entry.triggered_by_user.username.clone()),
        "org" => Some(organization.name.clone()),
        "users" => join(entry.refs.iter().filter_map(|r| match r {
            FeedRef::User { username, .. } => Some(username.as_str()),
            _ => None,
        })),
        "groups" => join(entry.refs.iter().filter_map(|r| match r {
            FeedRef::Group { name, .. } => Some(name.as_str()),
            _ => None,
        })),
        "articles" => join(entry.refs.iter().filter_map(|r| match r {
            FeedRef::Article { title, .. } => title.as_deref(),
            _ => None,
        })),
        "lists" => join(entry.refs.iter().filter_map(|r| match r {
            FeedRef::ArticleList { name, .. } => Some(name.as_str()),
            _ => None,
        })),
        "revision" => entry.refs.iter().find_map(|r| match r {
            FeedRef::ArticleRevision { title, .. } => Some(title.clone()),
            _ => None,
        }),
        // A revision without commit message renders as empty text.
        "commit" => entry.refs.iter().find_map(|r| match r {
            FeedRef::ArticleRevision { commit, .. } => Some(commit.clone().unwrap_or_default()),
            _ => None,
        }),
        _ => None,
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let values: Vec<&str> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tidings_types::models::UserSummary;
    use uuid::Uuid;

    fn entry(refs: Vec<FeedRef>) -> FeedEntry {
        FeedEntry {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            triggered_by_user: UserSummary { id: Uuid::new_v4(), username: "alice".into() },
            reason: "add_user_group_member".into(),
            public: true,
            room_id: None,
            read: true,
            refs,
            feed: String::new(),
            notification: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn org() -> OrganizationSummary {
        OrganizationSummary { id: Uuid::new_v4(), name: "Acme".into() }
    }

    #[test]
    fn substitutes_reference_lists() {
        let e = entry(vec![
            FeedRef::User { id: Uuid::new_v4(), username: "bob".into() },
            FeedRef::User { id: Uuid::new_v4(), username: "carol".into() },
            FeedRef::Group { id: Uuid::new_v4(), name: "Ops".into() },
        ]);

        let text = PlaceholderRenderer.render(&org(), "{actor} added {users} to group {groups}.", TextKind::Feed, &e, "en");
        assert_eq!(text.as_deref(), Some("alice added bob, carol to group Ops."));
    }

    #[test]
    fn key_value_placeholders() {
        let e = entry(vec![FeedRef::KeyValue { key: "name".into(), value: "Roadmap".into() }]);
        let text = PlaceholderRenderer.render(&org(), "deleted {var:name} in {org}", TextKind::Feed, &e, "en");
        assert_eq!(text.as_deref(), Some("deleted Roadmap in Acme"));
    }

    #[test]
    fn missing_data_is_a_soft_failure() {
        let e = entry(vec![]);
        assert!(PlaceholderRenderer.render(&org(), "{actor} edited {lists}", TextKind::Notification, &e, "en").is_none());
        assert!(PlaceholderRenderer.render(&org(), "{actor", TextKind::Feed, &e, "en").is_none());
        assert!(PlaceholderRenderer.render(&org(), "{nope}", TextKind::Feed, &e, "en").is_none());
    }
}
