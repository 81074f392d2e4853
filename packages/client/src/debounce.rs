//! 送信するコード変更のデバウンス
//!
//! 入力が `window` の間途絶えたときに、最後の値だけを 1 回出力します。

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

/// デフォルトのデバウンス間隔
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct CodeDebouncer {
    input: mpsc::UnboundedSender<String>,
    handle: JoinHandle<()>,
}

impl CodeDebouncer {
    /// デバウンサーを起動し、出力側の受信チャンネルと一緒に返す
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(debounce_loop(window, input_rx, output));
        (Self { input, handle }, output_rx)
    }

    /// 新しいコードを投入する
    pub fn push(&self, code: String) {
        if self.input.send(code).is_err() {
            tracing::debug!("Debouncer already stopped");
        }
    }
}

impl Drop for CodeDebouncer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn debounce_loop(
    window: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<String>,
) {
    while let Some(mut latest) = input.recv().await {
        loop {
            match tokio::time::timeout(window, input.recv()).await {
                // 間隔内に次の入力: 待ち直す
                Ok(Some(next)) => latest = next,
                // 入力側が閉じた: 最後の値を流して終了
                Ok(None) => {
                    let _ = output.send(latest);
                    return;
                }
                // 間隔が空いた
                Err(_) => {
                    if output.send(latest).is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_burst_emits_only_last_value() {
        // テスト項目: 間隔内の連続入力は最後の値 1 つにまとめられる
        // given (前提条件):
        let (debouncer, mut rx) = CodeDebouncer::new(WINDOW);

        // when (操作):
        debouncer.push("a".to_string());
        debouncer.push("ab".to_string());
        debouncer.push("abc".to_string());

        // then (期待する結果):
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(first, Some("abc".to_string()));
        let second = tokio::time::timeout(WINDOW * 3, rx.recv()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_separate_bursts_emit_separately() {
        // テスト項目: 間隔を空けた入力はそれぞれ出力される
        // given (前提条件):
        let (debouncer, mut rx) = CodeDebouncer::new(WINDOW);

        // when (操作):
        debouncer.push("first".to_string());
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        debouncer.push("second".to_string());
        let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first, Some("first".to_string()));
        assert_eq!(second, Some("second".to_string()));
    }
}
