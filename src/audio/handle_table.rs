//! 句柄表模块
//!
//! 以不透明的数字句柄管理解码器持有的状态，替代裸指针句柄。
//! 句柄 `0` 保留为空值（FFI边界上的失败哨兵）。

use crate::error::{AudioError, AudioResult, HandleMisuseKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 解码状态的不透明句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeHandle(u32);

impl DecodeHandle {
    /// 从原始数值构造（FFI入口使用），`0` 返回 `None`
    pub fn from_raw(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// 原始数值（非零）
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DecodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 句柄表：id → 条目
///
/// 已签发过但不在表中的id视为“已释放”，从未签发过的id视为“未知”。
pub struct HandleTable<T> {
    entries: Mutex<HashMap<u32, T>>,
    next_id: AtomicU32,
    /// 计数器回绕后，`next_id` 不再能区分已释放与未知
    wrapped: AtomicBool,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            wrapped: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> AudioResult<MutexGuard<'_, HashMap<u32, T>>> {
        self.entries
            .lock()
            .map_err(|e| AudioError::ResourceError(format!("句柄表锁获取失败: {e}")))
    }

    fn allocate_id(&self) -> u32 {
        let raw = self.next_id.fetch_add(1, Ordering::SeqCst);
        if raw == 0 || raw == u32::MAX {
            // 回绕：跳过保留值0
            self.next_id.store(2, Ordering::SeqCst);
            self.wrapped.store(true, Ordering::SeqCst);
            1
        } else {
            raw
        }
    }

    fn misuse(&self, raw: u32) -> AudioError {
        let issued = self.wrapped.load(Ordering::SeqCst) || raw < self.next_id.load(Ordering::SeqCst);
        AudioError::HandleMisuse {
            handle: raw,
            kind: if issued {
                HandleMisuseKind::Released
            } else {
                HandleMisuseKind::Unknown
            },
        }
    }

    /// 登记条目并签发新句柄
    pub fn insert(&self, entry: T) -> AudioResult<DecodeHandle> {
        let mut entries = self.lock()?;
        let mut id = self.allocate_id();
        while entries.contains_key(&id) {
            id = self.allocate_id();
        }
        entries.insert(id, entry);
        Ok(DecodeHandle(id))
    }

    /// 在持锁期间访问条目
    pub fn with<R>(&self, handle: DecodeHandle, f: impl FnOnce(&T) -> R) -> AudioResult<R> {
        let entries = self.lock()?;
        match entries.get(&handle.0) {
            Some(entry) => Ok(f(entry)),
            None => Err(self.misuse(handle.0)),
        }
    }

    /// 移除条目并交还所有权；重复移除报告 `HandleMisuseKind::Released`
    pub fn remove(&self, handle: DecodeHandle) -> AudioResult<T> {
        let mut entries = self.lock()?;
        entries.remove(&handle.0).ok_or_else(|| self.misuse(handle.0))
    }

    /// 当前存活的句柄数量（锁中毒时仍按实际条目计数）
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_handles_are_nonzero_and_unique() {
        let table = HandleTable::new();
        let a = table.insert("a").unwrap();
        let b = table.insert("b").unwrap();
        assert_ne!(a, b);
        assert_ne!(a.as_raw(), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_with_reads_entry() {
        let table = HandleTable::new();
        let h = table.insert(vec![1.0f32, 2.0]).unwrap();
        let len = table.with(h, |v| v.len()).unwrap();
        assert_eq!(len, 2);
    }

    #[test]
    fn test_double_remove_reports_released() {
        let table = HandleTable::new();
        let h = table.insert(7u8).unwrap();
        assert_eq!(table.remove(h).unwrap(), 7);

        let err = table.remove(h).unwrap_err();
        assert!(matches!(
            err,
            AudioError::HandleMisuse {
                kind: HandleMisuseKind::Released,
                ..
            }
        ));

        let err = table.with(h, |_| ()).unwrap_err();
        assert!(matches!(
            err,
            AudioError::HandleMisuse {
                kind: HandleMisuseKind::Released,
                ..
            }
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_never_issued_reports_unknown() {
        let table: HandleTable<u8> = HandleTable::new();
        let bogus = DecodeHandle::from_raw(999).unwrap();
        let err = table.remove(bogus).unwrap_err();
        assert!(matches!(
            err,
            AudioError::HandleMisuse {
                handle: 999,
                kind: HandleMisuseKind::Unknown
            }
        ));
    }

    #[test]
    fn test_from_raw_zero_is_null() {
        assert!(DecodeHandle::from_raw(0).is_none());
        assert_eq!(DecodeHandle::from_raw(5).map(|h| h.as_raw()), Some(5));
    }

    #[test]
    fn test_concurrent_inserts_are_distinct() {
        let table = Arc::new(HandleTable::new());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|j| table.insert(i * 100 + j).unwrap().as_raw())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u32> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(table.len(), 400);
    }

    #[test]
    fn test_poisoned_lock_still_counts_live_handles() {
        let table = Arc::new(HandleTable::new());
        let h = table.insert(1u8).unwrap();

        let poisoner = Arc::clone(&table);
        let joined = std::thread::spawn(move || {
            let _ = poisoner.with(h, |_| -> u8 { panic!("中毒 / poisoned") });
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        assert!(matches!(
            table.insert(2u8),
            Err(AudioError::ResourceError(_))
        ));
    }
}
