use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::userdb::errors::UserDbError;
use crate::userdb::mapper::{
    ACCOUNT_ID_KEY, EMAIL_KEY, ID_KEY, OAUTH_ACCOUNTS_KEY, OAUTH_NAME_KEY, id_to_bson,
};

use super::types::{InMemoryUserCollection, MemoryState, UserCollection, UserFilter};

impl InMemoryUserCollection {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory user collection");
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.state.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether the unique email index has been built
    pub async fn has_email_index(&self) -> bool {
        self.state.lock().await.email_index
    }

    /// How many times index creation was requested
    pub async fn index_requests(&self) -> usize {
        self.state.lock().await.index_requests
    }
}

fn normalized_email(document: &Document) -> Option<String> {
    document.get_str(EMAIL_KEY).ok().map(str::to_lowercase)
}

fn filter_matches(document: &Document, filter: &UserFilter) -> bool {
    match filter {
        UserFilter::Id(id) => document.get(ID_KEY) == Some(&id_to_bson(id)),
        UserFilter::Email(email) => normalized_email(document) == Some(email.to_lowercase()),
        UserFilter::OAuthAccount {
            oauth_name,
            account_id,
        } => match document.get_array(OAUTH_ACCOUNTS_KEY) {
            Ok(accounts) => accounts.iter().any(|account| match account {
                Bson::Document(sub) => {
                    sub.get_str(OAUTH_NAME_KEY).ok() == Some(oauth_name.as_str())
                        && sub.get_str(ACCOUNT_ID_KEY).ok() == Some(account_id.as_str())
                }
                _ => false,
            }),
            Err(_) => false,
        },
    }
}

impl MemoryState {
    /// Check `candidate` against the unique keys of every document except `skip`
    fn check_unique(
        &self,
        candidate: &Document,
        skip: Option<usize>,
    ) -> Result<(), UserDbError> {
        let candidate_email = normalized_email(candidate);

        for (index, existing) in self.documents.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            if existing.get(ID_KEY) == candidate.get(ID_KEY) {
                return Err(UserDbError::DuplicateKey(format!(
                    "duplicate {ID_KEY} in user collection"
                )));
            }
            if self.email_index
                && candidate_email.is_some()
                && normalized_email(existing) == candidate_email
            {
                return Err(UserDbError::DuplicateKey(format!(
                    "duplicate {EMAIL_KEY} in user collection"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserCollection for InMemoryUserCollection {
    async fn ensure_email_index(&self) -> Result<(), UserDbError> {
        let mut state = self.state.lock().await;
        state.index_requests += 1;

        if state.email_index {
            return Ok(());
        }

        let mut seen = std::collections::HashSet::new();
        for email in state.documents.iter().filter_map(normalized_email) {
            if !seen.insert(email) {
                return Err(UserDbError::DuplicateKey(format!(
                    "cannot build unique index on {EMAIL_KEY}: duplicates present"
                )));
            }
        }

        state.email_index = true;
        Ok(())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<Document>, UserDbError> {
        let state = self.state.lock().await;
        Ok(state
            .documents
            .iter()
            .find(|document| filter_matches(document, filter))
            .cloned())
    }

    async fn insert_one(&self, document: Document) -> Result<(), UserDbError> {
        let mut state = self.state.lock().await;
        state.check_unique(&document, None)?;
        state.documents.push(document);
        Ok(())
    }

    async fn replace_one(
        &self,
        filter: &UserFilter,
        document: Document,
    ) -> Result<bool, UserDbError> {
        let mut state = self.state.lock().await;
        let Some(position) = state.documents.iter().position(|d| filter_matches(d, filter)) else {
            return Ok(false);
        };

        state.check_unique(&document, Some(position))?;
        state.documents[position] = document;
        Ok(true)
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<bool, UserDbError> {
        let mut state = self.state.lock().await;
        match state.documents.iter().position(|d| filter_matches(d, filter)) {
            Some(position) => {
                state.documents.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
