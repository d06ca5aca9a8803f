//! 値オブジェクト（Value Object）
//!
//! 識別子はすべて空でない文字列をラップした newtype です。
//! 空文字列・空白のみの識別子は「指定なし」として扱われるべきなので、
//! 生成時点で `ValueObjectError` として拒否します。

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// 空でない文字列から生成
            pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValueObjectError::EmptyIdentifier($label));
                }
                Ok(Self(value))
            }

            /// UUID から生成（常に空でない）
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// 認証済みユーザーの識別子
    UserId,
    "user id"
);
string_id!(
    /// チャット（1:1 またはグループ）の識別子
    ChatId,
    "chat id"
);
string_id!(
    /// 永続化されたメッセージの識別子
    MessageId,
    "message id"
);
string_id!(
    /// 生存中の WebSocket 接続ごとに一意な識別子
    ConnectionId,
    "connection id"
);
string_id!(
    /// Room（マルチキャストグループ）の識別子。チャット ID と同じ値を使う
    RoomId,
    "room id"
);

impl From<&ChatId> for RoomId {
    fn from(chat_id: &ChatId) -> Self {
        Self(chat_id.as_str().to_string())
    }
}

impl From<ChatId> for RoomId {
    fn from(chat_id: ChatId) -> Self {
        Self(chat_id.into_string())
    }
}

/// メッセージ本文
///
/// 前後の空白は取り除かれ、空の本文は生成できない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// メッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Gif,
    Link,
    Audio,
    File,
    Video,
}

impl MessageKind {
    /// テキストメッセージは本文必須
    pub fn requires_content(self) -> bool {
        matches!(self, MessageKind::Text)
    }
}

/// 外部ストレージ上のメディアへの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub public_id: Option<String>,
    pub format: Option<String>,
    pub size: Option<u64>,
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 既読ユーザー集合
///
/// 追加のみ可能な集合。同じユーザーを何度追加しても結果は変わらない。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadBy(BTreeSet<UserId>);

impl ReadBy {
    /// 送信者のみを含む集合
    pub fn with_sender(sender: &UserId) -> Self {
        let mut set = BTreeSet::new();
        set.insert(sender.clone());
        Self(set)
    }

    /// 集合に追加する。新たに追加された場合のみ `true`
    pub fn insert(&mut self, user_id: &UserId) -> bool {
        self.0.insert(user_id.clone())
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.0.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }
}

/// ページ指定（1 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 50;

    /// 0 や未指定は 1 / 既定値に丸める
    pub fn new(number: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
