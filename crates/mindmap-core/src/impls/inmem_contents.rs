//! InMemoryContentsApi - プロセス内の ContentsApi 実装
//!
//! # 実装
//! - (branch, path) をキーに `RemoteFile` を保持する
//! - sha は保存された base64 文字列の SHA-256（hex）
//! - `prior_hash` が現在の sha と一致しない PUT は拒否する（リモートの競合検知を模倣）
//!
//! # 使い方
//! テストでは失敗注入と呼び出し回数の確認に使う。
//! `MINDMAP_REMOTE=memory` で開発用のリモートとしても使える（プロセス終了で消える）。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::domain::{RemoteFile, StorageRecord, StoreError};
use crate::ports::ContentsApi;

type FileKey = (String, String);

#[derive(Default)]
pub struct InMemoryContentsApi {
    files: Mutex<HashMap<FileKey, RemoteFile>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl InMemoryContentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の `get` をすべてリモートエラーにする
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 以降の `put` をすべてリモートエラーにする
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn sha_of(&self, path: &str, branch: &str) -> Option<String> {
        let files = self.files.lock().await;
        files
            .get(&(branch.to_string(), path.to_string()))
            .map(|file| file.sha.clone())
    }

    fn content_sha(content_base64: &str) -> String {
        format!("{:x}", Sha256::digest(content_base64.as_bytes()))
    }
}

#[async_trait]
impl ContentsApi for InMemoryContentsApi {
    async fn get(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Remote(format!("simulated read failure: {path}")));
        }

        let files = self.files.lock().await;
        Ok(files.get(&(branch.to_string(), path.to_string())).cloned())
    }

    async fn put(&self, record: &StorageRecord, _message: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Remote(format!(
                "simulated write failure: {}",
                record.path
            )));
        }

        let mut files = self.files.lock().await;
        let key = (record.branch.clone(), record.path.clone());
        let current = files.get(&key).map(|file| file.sha.as_str());
        if current != record.prior_hash.as_deref() {
            return Err(StoreError::Remote(format!(
                "conflict at {}: expected sha {:?}, found {:?}",
                record.path, record.prior_hash, current
            )));
        }

        let file = RemoteFile {
            sha: Self::content_sha(&record.content_base64),
            content_base64: record.content_base64.clone(),
        };
        files.insert(key, file);
        Ok(())
    }
}
