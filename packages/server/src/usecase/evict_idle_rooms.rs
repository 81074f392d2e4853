//! UseCase: 空のルームの破棄
//!
//! 保持ポリシーに従い、空の状態が続いたルームをレジストリから削除します。
//! UI 層のバックグラウンドタスクから定期的に呼ばれます。

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::domain::{RoomId, RoomRepository, RoomRetention, Timestamp};

/// 空ルーム破棄のユースケース
pub struct EvictIdleRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    retention: RoomRetention,
}

impl EvictIdleRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
        retention: RoomRetention,
    ) -> Self {
        Self {
            repository,
            clock,
            retention,
        }
    }

    /// 期限切れの空ルームを削除し、削除した RoomId を返す
    pub async fn execute(&self) -> Vec<RoomId> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut evicted = Vec::new();

        for room in self.repository.get_rooms().await {
            let Some(emptied_at) = room.emptied_at else {
                continue;
            };
            if room.is_empty() && self.retention.is_expired(emptied_at, now) {
                self.repository.remove_room(&room.id).await;
                tracing::info!("Room '{}' evicted (idle since {})", room.id, emptied_at.value());
                evicted.push(room.id);
            }
        }

        evicted
    }
}
