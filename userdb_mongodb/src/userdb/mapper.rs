//! Translation between [`User`] and the BSON document stored per user.
//!
//! The logical [`UserId`] lives under the native `_id` key as a UUID binary
//! (subtype 4). Everything else maps one field to one key, with OAuth
//! accounts embedded as an ordered array of sub-documents.

use mongodb::bson::{Binary, Bson, Document, spec::BinarySubtype};
use uuid::Uuid;

use super::errors::UserDbError;
use super::types::{OAuthAccount, User, UserId};

pub(crate) const ID_KEY: &str = "_id";
pub(crate) const EMAIL_KEY: &str = "email";
pub(crate) const OAUTH_ACCOUNTS_KEY: &str = "oauth_accounts";
pub(crate) const OAUTH_NAME_KEY: &str = "oauth_name";
pub(crate) const ACCOUNT_ID_KEY: &str = "account_id";

const HASHED_PASSWORD_KEY: &str = "hashed_password";
const IS_ACTIVE_KEY: &str = "is_active";
const IS_SUPERUSER_KEY: &str = "is_superuser";
const IS_VERIFIED_KEY: &str = "is_verified";

const OAUTH_ID_KEY: &str = "id";
const ACCESS_TOKEN_KEY: &str = "access_token";
const EXPIRES_AT_KEY: &str = "expires_at";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const ACCOUNT_EMAIL_KEY: &str = "account_email";

/// Native key for a logical id
pub(crate) fn id_to_bson(id: &UserId) -> Bson {
    uuid_to_bson(id.as_uuid())
}

fn uuid_to_bson(uuid: &Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: uuid.as_bytes().to_vec(),
    })
}

fn uuid_from_bson(document: &Document, key: &str) -> Result<Uuid, UserDbError> {
    match document.get(key) {
        Some(Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes,
            ..
        })) => Uuid::from_slice(bytes)
            .map_err(|e| UserDbError::Deserialization(format!("{key}: {e}"))),
        Some(other) => Err(UserDbError::Deserialization(format!(
            "{key}: expected UUID binary, found {:?}",
            other.element_type()
        ))),
        None => Err(missing(key)),
    }
}

fn missing(key: &str) -> UserDbError {
    UserDbError::Deserialization(format!("missing field `{key}`"))
}

fn required_str(document: &Document, key: &str) -> Result<String, UserDbError> {
    document
        .get_str(key)
        .map(str::to_string)
        .map_err(|e| UserDbError::Deserialization(format!("{key}: {e}")))
}

fn required_bool(document: &Document, key: &str) -> Result<bool, UserDbError> {
    document
        .get_bool(key)
        .map_err(|e| UserDbError::Deserialization(format!("{key}: {e}")))
}

fn optional_str(document: &Document, key: &str) -> Result<Option<String>, UserDbError> {
    match document.get(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(UserDbError::Deserialization(format!(
            "{key}: expected string, found {:?}",
            other.element_type()
        ))),
    }
}

fn optional_i64(document: &Document, key: &str) -> Result<Option<i64>, UserDbError> {
    match document.get(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Int64(v)) => Ok(Some(*v)),
        Some(Bson::Int32(v)) => Ok(Some(i64::from(*v))),
        Some(other) => Err(UserDbError::Deserialization(format!(
            "{key}: expected integer, found {:?}",
            other.element_type()
        ))),
    }
}

fn oauth_account_to_document(account: &OAuthAccount) -> Document {
    let mut document = Document::new();
    document.insert(OAUTH_ID_KEY, uuid_to_bson(&account.id));
    document.insert(OAUTH_NAME_KEY, account.oauth_name.as_str());
    document.insert(ACCESS_TOKEN_KEY, account.access_token.as_str());
    document.insert(
        EXPIRES_AT_KEY,
        account.expires_at.map_or(Bson::Null, Bson::Int64),
    );
    document.insert(
        REFRESH_TOKEN_KEY,
        account
            .refresh_token
            .as_ref()
            .map_or(Bson::Null, |t| Bson::String(t.clone())),
    );
    document.insert(ACCOUNT_ID_KEY, account.account_id.as_str());
    document.insert(ACCOUNT_EMAIL_KEY, account.account_email.as_str());
    document
}

fn oauth_account_from_document(document: &Document) -> Result<OAuthAccount, UserDbError> {
    Ok(OAuthAccount {
        id: uuid_from_bson(document, OAUTH_ID_KEY)?,
        oauth_name: required_str(document, OAUTH_NAME_KEY)?,
        access_token: required_str(document, ACCESS_TOKEN_KEY)?,
        expires_at: optional_i64(document, EXPIRES_AT_KEY)?,
        refresh_token: optional_str(document, REFRESH_TOKEN_KEY)?,
        account_id: required_str(document, ACCOUNT_ID_KEY)?,
        account_email: required_str(document, ACCOUNT_EMAIL_KEY)?,
    })
}

/// Serialize a user into its stored document
pub fn to_document(user: &User) -> Document {
    let oauth_accounts: Vec<Bson> = user
        .oauth_accounts
        .iter()
        .map(|a| Bson::Document(oauth_account_to_document(a)))
        .collect();

    let mut document = Document::new();
    document.insert(ID_KEY, id_to_bson(&user.id));
    document.insert(EMAIL_KEY, user.email.as_str());
    document.insert(HASHED_PASSWORD_KEY, user.hashed_password.as_str());
    document.insert(IS_ACTIVE_KEY, user.is_active);
    document.insert(IS_SUPERUSER_KEY, user.is_superuser);
    document.insert(IS_VERIFIED_KEY, user.is_verified);
    document.insert(OAUTH_ACCOUNTS_KEY, oauth_accounts);
    document
}

/// Rebuild a user from its stored document
pub fn from_document(document: &Document) -> Result<User, UserDbError> {
    let oauth_accounts = match document.get(OAUTH_ACCOUNTS_KEY) {
        None | Some(Bson::Null) => Vec::new(),
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| match item {
                Bson::Document(sub) => oauth_account_from_document(sub),
                other => Err(UserDbError::Deserialization(format!(
                    "{OAUTH_ACCOUNTS_KEY}: expected sub-document, found {:?}",
                    other.element_type()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(UserDbError::Deserialization(format!(
                "{OAUTH_ACCOUNTS_KEY}: expected array, found {:?}",
                other.element_type()
            )));
        }
    };

    Ok(User {
        id: UserId::from(uuid_from_bson(document, ID_KEY)?),
        email: required_str(document, EMAIL_KEY)?,
        hashed_password: required_str(document, HASHED_PASSWORD_KEY)?,
        is_active: required_bool(document, IS_ACTIVE_KEY)?,
        is_superuser: required_bool(document, IS_SUPERUSER_KEY)?,
        is_verified: required_bool(document, IS_VERIFIED_KEY)?,
        oauth_accounts,
    })
}
