//! HTTP API endpoint handlers.
//!
//! WebSocket と同じ UseCase（永続化 → ファンアウト）を通るので、
//! HTTP から送信・既読・削除しても接続中のクライアントに配信される。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ChatId, DeleteRequest, MessageId, Page, UserId},
    infrastructure::dto::{
        http::{
            AccessChatRequest, CreateGroupRequest, DeletedResponse, GroupMemberRequest,
            MarkReadResponse, PageQuery, RenameGroupRequest,
        },
        websocket::{ChatDto, MarkReadPayload, MessageDto, SendMessagePayload},
    },
    ui::{error::ApiError, extractor::AuthUser, state::AppState},
    usecase::{MemberRemoval, NewGroup},
};

/// 必須の識別子を取り出す
fn required<T>(field: &str, value: Option<String>) -> Result<T, ApiError>
where
    T: TryFrom<String>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

fn page_of(query: &PageQuery) -> Page {
    Page::new(query.page, query.limit)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// オンラインユーザー一覧
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Json<Vec<String>> {
    let online = state
        .presence
        .list_online_users()
        .into_iter()
        .map(UserId::into_string)
        .collect();
    Json(online)
}

/// `POST /api/chat/access`（作成した場合は 201）
pub async fn access_chat(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(request): Json<AccessChatRequest>,
) -> Result<(StatusCode, Json<ChatDto>), ApiError> {
    let other: UserId = required("userId", request.user_id)?;
    let (view, created) = state
        .access_chat_usecase
        .execute(&requester, &other)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ChatDto::from(&view))))
}

/// `GET /api/chat`
pub async fn fetch_chats(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ChatDto>>, ApiError> {
    let views = state
        .fetch_chats_usecase
        .execute(&requester, page_of(&query))
        .await?;
    Ok(Json(views.iter().map(ChatDto::from).collect()))
}

/// `POST /api/chat/group`
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ChatDto>), ApiError> {
    let users = request
        .users
        .into_iter()
        .filter(|u| !u.trim().is_empty())
        .map(UserId::new)
        .collect::<Result<Vec<_>, _>>()?;
    let view = state
        .manage_group_usecase
        .create(
            &requester,
            NewGroup {
                name: request.name,
                users,
                avatar: request.group_avatar,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ChatDto::from(&view))))
}

/// `PUT /api/chat/rename`
pub async fn rename_group(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(request): Json<RenameGroupRequest>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id: ChatId = required("chatId", request.chat_id)?;
    let view = state
        .manage_group_usecase
        .rename(&requester, &chat_id, request.name, request.group_avatar)
        .await?;
    Ok(Json(ChatDto::from(&view)))
}

/// `PUT /api/chat/add`
pub async fn add_to_group(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(request): Json<GroupMemberRequest>,
) -> Result<Json<ChatDto>, ApiError> {
    let chat_id: ChatId = required("chatId", request.chat_id)?;
    let user_id: UserId = required("userId", request.user_id)?;
    let view = state
        .manage_group_usecase
        .add_member(&requester, &chat_id, user_id)
        .await?;
    Ok(Json(ChatDto::from(&view)))
}

/// `PUT /api/chat/remove`
///
/// グループが最小人数を下回って削除された場合は `{id, deleted: true}` を返す。
pub async fn remove_from_group(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(request): Json<GroupMemberRequest>,
) -> Result<Response, ApiError> {
    let chat_id: ChatId = required("chatId", request.chat_id)?;
    let user_id: UserId = required("userId", request.user_id)?;
    let removal = state
        .manage_group_usecase
        .remove_member(&requester, &chat_id, &user_id)
        .await?;
    let response = match removal {
        MemberRemoval::Updated(view) => Json(ChatDto::from(&view)).into_response(),
        MemberRemoval::Deleted(chat_id) => Json(DeletedResponse {
            id: chat_id.into_string(),
            deleted: true,
        })
        .into_response(),
    };
    Ok(response)
}

/// `DELETE /api/chat/{id}`
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    state
        .delete_chat_usecase
        .execute(&requester, &chat_id)
        .await?;
    Ok(Json(DeletedResponse {
        id: chat_id.into_string(),
        deleted: true,
    }))
}

/// `GET /api/message/{id}`（`id` はチャット ID）
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(chat_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let views = state
        .get_messages_usecase
        .execute(
            &requester,
            &chat_id,
            page_of(&query),
            query.sort.unwrap_or_default(),
        )
        .await?;
    Ok(Json(views.iter().map(MessageDto::from).collect()))
}

/// `POST /api/message`
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(sender): AuthUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let view = state
        .send_message_usecase
        .execute(Some(&sender), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(MessageDto::from(&view))))
}

/// `PUT /api/message/read`
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(reader): AuthUser,
    Json(payload): Json<MarkReadPayload>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state
        .mark_read_usecase
        .execute(Some(&reader), None, payload.into())
        .await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// `DELETE /api/message/{id}`（`id` はメッセージ ID）
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let message_id = MessageId::new(message_id)?;
    let (message_id, _) = state
        .delete_message_usecase
        .execute(
            Some(&requester),
            DeleteRequest {
                message_id: Some(message_id),
            },
        )
        .await?;
    Ok(Json(DeletedResponse {
        id: message_id.into_string(),
        deleted: true,
    }))
}
