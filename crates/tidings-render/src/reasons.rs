use std::collections::HashMap;

/// Templates registered for one reason in one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonTemplates {
    pub feed: &'static str,
    /// Text shown to notified users. `None` reuses the feed text.
    pub notification: Option<&'static str>,
}

/// Knows which reason codes exist and how they are worded.
pub trait ReasonCatalogue: Send + Sync {
    fn reason_exists(&self, code: &str) -> bool;

    fn templates(&self, language: &str, code: &str) -> Option<ReasonTemplates>;
}

/// Reason codes are validated against this language.
const CANONICAL_LANGUAGE: &str = "en";

type Table = &'static [(&'static str, &'static str, Option<&'static str>)];

const EN: Table = &[
    ("joined_organization", "{actor} joined the organization.", None),
    ("left_organization", "{actor} left the organization.", None),
    ("create_article", "{actor} created a new article {revision}.", None),
    ("update_article", "{actor} edited the article {revision}.", Some("{actor} edited the article {revision}: {commit}")),
    ("reset_article", "{actor} reset the article {revision}.", None),
    ("delete_article_history_entry", "{actor} modified the history of article {revision}.", None),
    ("add_article_list_entry", "{actor} added {articles} to list {lists}.", None),
    ("add_protected_article_list_entry", "{actor} added articles to list {lists}.", None),
    ("add_article_list_member", "{actor} added {users} to list {lists}.", Some("{actor} added you to list {lists}.")),
    ("remove_protected_article_list_entry", "{actor} removed an article from list {lists}.", None),
    ("remove_article_list_entry", "{actor} removed an article from list {lists}.", None),
    ("remove_article_list_member", "{actor} removed {users} from list {lists}.", Some("{actor} removed you from list {lists}.")),
    ("create_article_list", "{actor} created a new list {lists}.", None),
    ("update_article_list", "{actor} edited the list {lists}.", None),
    ("set_article_list_moderator", "{actor} granted moderator permissions to you for list {lists}.", None),
    ("remove_article_list_moderator", "{actor} removed your moderator permissions from list {lists}.", None),
    ("add_user_group_member", "{actor} added {users} to group {groups}.", Some("{actor} added you to group {groups}.")),
    ("remove_user_group_member", "{actor} removed {users} from group {groups}.", Some("{actor} removed you from group {groups}.")),
    ("create_user_group", "{actor} created a new group {groups}.", None),
    ("update_user_group", "{actor} edited the group {groups}.", None),
    ("set_user_group_moderator", "{actor} granted moderator permissions to you for group {groups}.", None),
    ("remove_user_group_moderator", "{actor} removed your moderator permissions from group {groups}.", None),
    ("recommend_article", "{actor} recommended the article {articles} to you.", None),
    ("invite_article", "{actor} invited you to edit the article {articles}.", None),
    ("invite_new_article", "{actor} invited you to edit a new article.", None),
    ("archived_article", "{actor} archived the article {articles}.", None),
    ("restored_article", "{actor} restored the article {articles}.", None),
    ("set_organization_moderator", "{actor} made you a moderator of {org}.", None),
    ("remove_organization_moderator", "{actor} removed your moderator permissions for {org}.", None),
    ("set_organization_admin", "{actor} made you an administrator of {org}.", None),
    ("remove_organization_admin", "{actor} removed your administrator permissions for {org}.", None),
    ("copy_article", "{actor} copied the article {articles}.", None),
    ("delete_article", "{actor} deleted the article {var:name}.", None),
    ("delete_articlelist", "{actor} deleted the list {var:name}.", None),
    ("delete_usergroup", "{actor} deleted the group {var:name}.", None),
    ("delete_tag", "{actor} deleted the tag {var:name}.", None),
    ("remove_member_read_only", "{actor} granted you write access.", None),
    ("set_member_read_only", "{actor} set your access to read only.", None),
    ("transfer_ownership", "{actor} transferred the ownership of {org} to you.", None),
    ("mentioned", "{actor} mentioned you in {articles}.", None),
    ("recommendation_confirmation", "{users} read the article {articles} you recommended.", None),
];

const DE: Table = &[
    ("joined_organization", "{actor} ist der Organisation beigetreten.", None),
    ("left_organization", "{actor} hat die Organisation verlassen.", None),
    ("create_article", "{actor} hat den Artikel {revision} erstellt.", None),
    ("update_article", "{actor} hat den Artikel {revision} bearbeitet.", Some("{actor} hat den Artikel {revision} bearbeitet: {commit}")),
    ("reset_article", "{actor} hat den Artikel {revision} zurückgesetzt.", None),
    ("delete_article_history_entry", "{actor} hat den Verlauf des Artikels {revision} verändert.", None),
    ("add_article_list_entry", "{actor} hat {articles} zur Liste {lists} hinzugefügt.", None),
    ("add_protected_article_list_entry", "{actor} hat Artikel zur Liste {lists} hinzugefügt.", None),
    ("add_article_list_member", "{actor} hat {users} zur Liste {lists} hinzugefügt.", Some("{actor} hat dich zur Liste {lists} hinzugefügt.")),
    ("remove_protected_article_list_entry", "{actor} hat einen Artikel aus der Liste {lists} entfernt.", None),
    ("remove_article_list_entry", "{actor} hat einen Artikel aus der Liste {lists} entfernt.", None),
    ("remove_article_list_member", "{actor} hat {users} aus der Liste {lists} entfernt.", Some("{actor} hat dich aus der Liste {lists} entfernt.")),
    ("create_article_list", "{actor} hat die Liste {lists} erstellt.", None),
    ("update_article_list", "{actor} hat die Liste {lists} bearbeitet.", None),
    ("set_article_list_moderator", "{actor} hat dich zum Moderator der Liste {lists} gemacht.", None),
    ("remove_article_list_moderator", "{actor} hat dir die Moderatorrechte für die Liste {lists} entzogen.", None),
    ("add_user_group_member", "{actor} hat {users} zur Gruppe {groups} hinzugefügt.", Some("{actor} hat dich zur Gruppe {groups} hinzugefügt.")),
    ("remove_user_group_member", "{actor} hat {users} aus der Gruppe {groups} entfernt.", Some("{actor} hat dich aus der Gruppe {groups} entfernt.")),
    ("create_user_group", "{actor} hat die Gruppe {groups} erstellt.", None),
    ("update_user_group", "{actor} hat die Gruppe {groups} bearbeitet.", None),
    ("set_user_group_moderator", "{actor} hat dich zum Moderator der Gruppe {groups} gemacht.", None),
    ("remove_user_group_moderator", "{actor} hat dir die Moderatorrechte für die Gruppe {groups} entzogen.", None),
    ("recommend_article", "{actor} empfiehlt dir den Artikel {articles}.", None),
    ("invite_article", "{actor} hat dich eingeladen, den Artikel {articles} zu bearbeiten.", None),
    ("invite_new_article", "{actor} hat dich eingeladen, einen neuen Artikel zu bearbeiten.", None),
    ("archived_article", "{actor} hat den Artikel {articles} archiviert.", None),
    ("restored_article", "{actor} hat den Artikel {articles} wiederhergestellt.", None),
    ("set_organization_moderator", "{actor} hat dich zum Moderator von {org} gemacht.", None),
    ("remove_organization_moderator", "{actor} hat dir die Moderatorrechte für {org} entzogen.", None),
    ("set_organization_admin", "{actor} hat dich zum Administrator von {org} gemacht.", None),
    ("remove_organization_admin", "{actor} hat dir die Administratorrechte für {org} entzogen.", None),
    ("copy_article", "{actor} hat den Artikel {articles} kopiert.", None),
    ("delete_article", "{actor} hat den Artikel {var:name} gelöscht.", None),
    ("delete_articlelist", "{actor} hat die Liste {var:name} gelöscht.", None),
    ("delete_usergroup", "{actor} hat die Gruppe {var:name} gelöscht.", None),
    ("delete_tag", "{actor} hat den Tag {var:name} gelöscht.", None),
    ("remove_member_read_only", "{actor} hat dir Schreibrechte gegeben.", None),
    ("set_member_read_only", "{actor} hat deinen Zugriff auf Lesen beschränkt.", None),
    ("transfer_ownership", "{actor} hat dir die Organisation {org} übertragen.", None),
    ("mentioned", "{actor} hat dich in {articles} erwähnt.", None),
    ("recommendation_confirmation", "{users} hat den empfohlenen Artikel {articles} gelesen.", None),
];

/// Built-in catalogue: language code -> reason code -> templates.
#[derive(Debug, Clone)]
pub struct Reasons {
    languages: HashMap<&'static str, HashMap<&'static str, ReasonTemplates>>,
}

impl Reasons {
    pub fn builtin() -> Self {
        let mut languages = HashMap::new();

        for (code, table) in [("en", EN), ("de", DE)] {
            let reasons = table
                .iter()
                .map(|&(reason, feed, notification)| (reason, ReasonTemplates { feed, notification }))
                .collect();
            languages.insert(code, reasons);
        }

        Self { languages }
    }
}

impl Default for Reasons {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReasonCatalogue for Reasons {
    fn reason_exists(&self, code: &str) -> bool {
        self.languages
            .get(CANONICAL_LANGUAGE)
            .is_some_and(|reasons| reasons.contains_key(code))
    }

    fn templates(&self, language: &str, code: &str) -> Option<ReasonTemplates> {
        self.languages.get(language)?.get(code).copied()
    }
}
