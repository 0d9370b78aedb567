use std::time::Instant;
use tokio::sync::mpsc;

use super::{App, AppState, DeleteOutcome, LoadResult, SubmitOutcome};

impl App {
    /// バックグラウンドタスクの結果をすべて反映する（毎ティック）
    pub(crate) fn poll_updates(&mut self) {
        self.controller.expire_notification(Instant::now());
        self.poll_submit_updates();
        self.poll_delete_updates();
        self.poll_load_updates();
    }

    /// GET 結果のポーリング（到着順に反映）
    pub(crate) fn poll_load_updates(&mut self) {
        loop {
            match self.load_rx.try_recv() {
                Ok(result) => self.handle_load_result(result),
                Err(mpsc::error::TryRecvError::Empty) => break,
                // 送信側は App が保持しているため通常は起きない
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }
    }

    pub(crate) fn handle_load_result(&mut self, result: LoadResult) {
        if !self.controller.apply_loaded(result) {
            return;
        }

        if let Some(created) = self.controller.take_last_created() {
            // 新しいコメントが未表示ページにある場合は選択しない
            if !self.select_comment(&created) {
                tracing::debug!(id = %created, "created comment is not on a visible page");
            }
        }
        self.clamp_selection();
    }

    /// コメント送信結果のポーリング
    pub(crate) fn poll_submit_updates(&mut self) {
        match self.submit_rx.try_recv() {
            Ok(SubmitOutcome { request, result }) => {
                if self.controller.apply_submitted(&request, result) {
                    self.state = AppState::CommentList;
                    self.request_load();
                }
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {}
        }
    }

    /// 削除結果のポーリング
    pub(crate) fn poll_delete_updates(&mut self) {
        match self.delete_rx.try_recv() {
            Ok(DeleteOutcome { id, result }) => {
                if self.controller.apply_deleted(&id, result) {
                    self.request_load();
                }
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {}
        }
    }
}
