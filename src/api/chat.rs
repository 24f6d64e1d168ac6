use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        auth::{AuthToken, Member},
        chat::{ChatMessage, NewMessage},
    },
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![messages, post_message]
}

/// The chat log, oldest message first.
#[get("/api/chat")]
async fn messages(store: &State<Store>) -> Json<Vec<ChatMessage>> {
    Json(store.registry.read().await.chat())
}

#[post("/api/chat", data = "<message>", format = "json")]
async fn post_message(
    token: AuthToken<Member>,
    message: Json<NewMessage>,
    store: &State<Store>,
) -> Result<Json<ChatMessage>> {
    let user = store.user(token.id()).await?;
    let mut registry = store.registry.write().await;
    let posted = registry.post_message(&user, &message.text)?.clone();
    Ok(Json(posted))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{chat::CHAT_CAPACITY, user::Registration};

    use super::*;

    async fn say(client: &Client, text: &str) -> Status {
        client
            .post(uri!(post_message))
            .header(ContentType::JSON)
            .body(json!({ "text": text }).to_string())
            .dispatch()
            .await
            .status()
    }

    async fn chat_log(client: &Client) -> Vec<ChatMessage> {
        client
            .get(uri!(messages))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap()
    }

    #[backend_test(user)]
    async fn post_and_read(client: Client) {
        assert_eq!(Status::Ok, say(&client, "  Olá!  ").await);
        assert_eq!(Status::BadRequest, say(&client, "   ").await);

        let messages = chat_log(&client).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Olá!");
        assert_eq!(messages[0].user_name, Registration::example().name);
    }

    #[backend_test(user)]
    async fn keeps_newest_messages(client: Client) {
        for i in 0..CHAT_CAPACITY + 5 {
            assert_eq!(Status::Ok, say(&client, &format!("message {i}")).await);
        }

        let messages = chat_log(&client).await;
        assert_eq!(messages.len(), CHAT_CAPACITY);
        assert_eq!(messages[0].text, "message 5");
        assert_eq!(
            messages[CHAT_CAPACITY - 1].text,
            format!("message {}", CHAT_CAPACITY + 4)
        );
    }

    #[backend_test]
    async fn posting_requires_sign_in(client: Client) {
        assert_eq!(Status::Unauthorized, say(&client, "hello").await);
        assert!(chat_log(&client).await.is_empty());
    }
}
