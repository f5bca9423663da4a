//! 構築中の`base`/`check`配列と空きスロットのリスト
//!
//! 未使用のスロットは同じ配列を使った循環双方向リストで管理します。
//! 空きスロット`i`では`base[i] = -next`、`check[i] = -prev`となり、
//! `check[i] >= 0`であることが「使用中」の唯一の判定条件です。
//! リストは常にインデックスの昇順に並びます。

use crate::code::NULL_ID;
use crate::errors::{DarrayError, Result};

pub(crate) struct SlotArrays {
    base: Vec<i32>,
    check: Vec<i32>,
    head: usize,
    tail: usize,
}

// Every index stored here is below `base.len()`, which `grow()` keeps within `i32`.
#[inline(always)]
const fn link(index: usize) -> i32 {
    -(index as i32)
}

#[inline(always)]
const fn unlink(value: i32) -> usize {
    value.unsigned_abs() as usize
}

impl SlotArrays {
    /// `capacity`個のスロットを確保し、予約スロット以外をすべて空きリストに入れます。
    ///
    /// `capacity`は2以上である必要があります。
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(DarrayError::invalid_argument(
                "capacity",
                format!("at least 2 slots are required, but {capacity} was given"),
            ));
        }
        i32::try_from(capacity)?;

        let mut slots = Self {
            base: Vec::with_capacity(capacity),
            check: Vec::with_capacity(capacity),
            head: 1,
            tail: capacity - 1,
        };
        // base[0] and check[0] are never used.
        slots.base.push(NULL_ID as i32);
        slots.check.push(NULL_ID as i32);
        slots.create_empty_range(1, capacity - 1);
        Ok(slots)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// 空きリストの先頭を返します。
    #[inline(always)]
    pub const fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub fn is_free(&self, index: usize) -> bool {
        self.check[index] < 0
    }

    /// 空きスロット`index`の次の空きスロットを返します。
    #[inline(always)]
    pub fn next_free(&self, index: usize) -> usize {
        debug_assert!(self.is_free(index));
        unlink(self.base[index])
    }

    #[inline(always)]
    pub fn set_base(&mut self, index: usize, value: i32) {
        self.base[index] = value;
    }

    #[inline(always)]
    pub fn set_check(&mut self, index: usize, value: i32) {
        self.check[index] = value;
    }

    /// `index`を空きリストから取り除きます。
    ///
    /// スロット自身の`base`と`check`は書き換えません。呼び出し側が直後に設定します。
    ///
    /// # エラー
    ///
    /// スロットがすでに使用中の場合、[`DarrayError::InvalidState`]を返します。
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if !self.is_free(index) {
            return Err(DarrayError::invalid_state(
                "attempted to remove a used slot from the free list",
                format!("slot {index} (base = {}, check = {})", self.base[index], self.check[index]),
            ));
        }
        let next = unlink(self.base[index]);
        let prev = unlink(self.check[index]);
        if next == index {
            return Err(DarrayError::invalid_state(
                "attempted to remove the last free slot",
                format!("slot {index}"),
            ));
        }
        self.base[prev] = link(next);
        self.check[next] = link(prev);
        if index == self.head {
            self.head = next;
        }
        if index == self.tail {
            self.tail = prev;
        }
        Ok(())
    }

    /// 配列長が`min_len`以上になるよう拡張します。
    ///
    /// 新しい長さは`min_len`と現在の1.5倍の大きい方です。追加されたスロットは
    /// 空きリストの末尾に連結されます。
    pub fn grow(&mut self, min_len: usize) -> Result<()> {
        let len = self.len();
        if min_len <= len {
            return Ok(());
        }
        let new_len = min_len.max(len + (len >> 1));
        i32::try_from(new_len)?;

        tracing::debug!(from = len, to = new_len, "growing slot arrays");

        self.create_empty_range(len, new_len - 1);

        // Splice [len, new_len) between the current tail and head.
        let (head, tail, last) = (self.head, self.tail, new_len - 1);
        self.base[tail] = link(len);
        self.check[len] = link(tail);
        self.base[last] = link(head);
        self.check[head] = link(last);
        self.tail = last;
        Ok(())
    }

    /// `begin..=end`を空きスロットとして配列の末尾に追加します。
    ///
    /// 追加された区間はそれ自体で循環しており(`begin`の前が`end`、`end`の次が`begin`)、
    /// 既存のリストへの連結は呼び出し側が行います。
    fn create_empty_range(&mut self, begin: usize, end: usize) {
        debug_assert_eq!(self.len(), begin);
        debug_assert!(begin <= end);
        for i in begin..=end {
            let next = if i == end { begin } else { i + 1 };
            let prev = if i == begin { end } else { i - 1 };
            self.base.push(link(next));
            self.check.push(link(prev));
        }
    }

    /// 先頭`len`スロットに切り詰めた配列を返します。
    pub fn into_parts(mut self, len: usize) -> (Vec<i32>, Vec<i32>) {
        self.base.truncate(len);
        self.check.truncate(len);
        self.base.shrink_to_fit();
        self.check.shrink_to_fit();
        (self.base, self.check)
    }

    /// 空きリストを先頭から順にたどります。
    #[cfg(test)]
    fn free_list(&self) -> Vec<usize> {
        let mut list = vec![self.head];
        let mut i = self.next_free(self.head);
        while i != self.head {
            list.push(i);
            i = self.next_free(i);
        }
        list
    }
}
