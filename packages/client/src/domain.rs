//! 再接続ポリシー
//!
//! 副作用を持たない判定だけを置き、ランナーはこの結果に従って待機・再接続・終了します。

use std::time::Duration;

use crate::error::ClientError;

/// セッションが失敗した後の動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// `after` 待ってから `attempt` 回目の接続を試みる
    Retry { attempt: u32, after: Duration },
    /// 再接続しない
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    interval: Duration,
    failures: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            failures: 0,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 次に行う接続が何回目か（1 始まり）
    pub fn current_attempt(&self) -> u32 {
        self.failures + 1
    }

    /// セッションがエラーで終わったときの判定
    ///
    /// # Arguments
    ///
    /// * `error` - セッションを終わらせたエラー
    /// * `was_connected` - そのセッションでサーバーから `connected` を受け取っていたか
    pub fn on_session_error(&mut self, error: &ClientError, was_connected: bool) -> NextStep {
        if is_fatal(error) {
            return NextStep::GiveUp;
        }

        // 一度つながった接続が切れた場合は数え直す
        if was_connected {
            self.failures = 0;
        }
        self.failures += 1;

        if self.failures >= self.max_attempts {
            return NextStep::GiveUp;
        }
        NextStep::Retry {
            attempt: self.current_attempt(),
            after: self.interval,
        }
    }
}

/// 再接続しても解決しないエラーか
pub fn is_fatal(error: &ClientError) -> bool {
    matches!(error, ClientError::RoomFull(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn connection_lost() -> ClientError {
        ClientError::ConnectionError("network error".to_string())
    }

    #[test]
    fn test_room_full_gives_up_immediately() {
        // テスト項目: RoomFull の場合、試行回数に関係なく再接続しない
        // given (前提条件):
        let mut policy = ReconnectPolicy::new(5, INTERVAL);
        let error = ClientError::RoomFull("r1".to_string());

        // when (操作):
        let step = policy.on_session_error(&error, true);

        // then (期待する結果):
        assert_eq!(step, NextStep::GiveUp);
        assert!(is_fatal(&error));
        assert!(!is_fatal(&connection_lost()));
    }

    #[test]
    fn test_retries_until_limit() {
        // テスト項目: 接続できない状態が続くと上限で諦める
        // given (前提条件):
        let mut policy = ReconnectPolicy::new(3, INTERVAL);

        // when (操作):
        let steps: Vec<_> = (0..3)
            .map(|_| policy.on_session_error(&connection_lost(), false))
            .collect();

        // then (期待する結果):
        assert_eq!(
            steps,
            vec![
                NextStep::Retry {
                    attempt: 2,
                    after: INTERVAL
                },
                NextStep::Retry {
                    attempt: 3,
                    after: INTERVAL
                },
                NextStep::GiveUp,
            ]
        );
    }

    #[test]
    fn test_successful_session_resets_count() {
        // テスト項目: 一度つながったセッションが切れた場合は試行回数が数え直される
        // given (前提条件):
        let mut policy = ReconnectPolicy::new(3, INTERVAL);
        policy.on_session_error(&connection_lost(), false);
        policy.on_session_error(&connection_lost(), false);

        // when (操作):
        let step = policy.on_session_error(&connection_lost(), true);

        // then (期待する結果):
        assert_eq!(
            step,
            NextStep::Retry {
                attempt: 2,
                after: INTERVAL
            }
        );
    }
}
