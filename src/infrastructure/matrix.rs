//! # Matrix Channel Adapter
//!
//! Implements the `ChatChannel` trait for the Matrix protocol using the
//! `matrix_sdk`. This module acts as the bridge between the generic reply
//! envelope used by the pipeline and the specific sending details of the
//! Matrix SDK.

use async_trait::async_trait;
use matrix_sdk::attachment::AttachmentConfig;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

use crate::domain::traits::ChatChannel;
use crate::domain::types::Reply;

#[derive(Clone)]
pub struct MatrixChannel {
    room: Room,
}

impl MatrixChannel {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatChannel for MatrixChannel {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_reply(&self, reply: Reply) -> Result<(), String> {
        match reply {
            Reply::Image(image) => {
                tracing::info!(
                    "Bot sending card image to {} ({} bytes)",
                    self.room_id(),
                    image.len()
                );
                self.room
                    .send_attachment(
                        "ai-daily.png",
                        &mime::IMAGE_PNG,
                        image.to_vec(),
                        AttachmentConfig::new(),
                    )
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
            Reply::Error(message) => {
                tracing::info!("Bot sending error to {}: {}", self.room_id(), message);
                self.room
                    .send(RoomMessageEventContent::text_plain(&message))
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
        }
    }
}
