/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Hands out apng sequence numbers.
///
/// One instance covers one apng stream, every fcTL and fdAT chunk
/// takes the next number, starting at zero, in the order they are written.
#[derive(Debug, Default)]
pub struct SequenceNumbers {
    next: u32
}

impl SequenceNumbers {
    pub const fn new() -> SequenceNumbers {
        SequenceNumbers { next: 0 }
    }

    /// Return the current number and advance
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        let current = self.next;
        self.next = self.next.wrapping_add(1);
        current
    }

    /// The number the next call to [`next`](Self::next) returns
    pub const fn peek(&self) -> u32 {
        self.next
    }
}

#[test]
fn test_sequence_is_contiguous() {
    let mut seq = SequenceNumbers::new();
    let taken: Vec<u32> = (0..5).map(|_| seq.next()).collect();
    assert_eq!(taken, [0, 1, 2, 3, 4]);
    assert_eq!(seq.peek(), 5);
}
