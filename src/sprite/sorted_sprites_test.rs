use alloc::vec::Vec;

use super::sorted_sprites::{SortKey, SortedSprites};

fn order(sorted: &SortedSprites) -> Vec<usize> {
    return sorted.iter().collect();
}

/// Keys are sorted, ties keep insertion order
#[test]
fn test_insert_order() {
    let mut sorted = SortedSprites::new(8);
    sorted.insert(0, SortKey::new(1, 0));
    sorted.insert(1, SortKey::new(0, 0));
    sorted.insert(2, SortKey::new(1, 0));
    sorted.insert(3, SortKey::new(0, -5));
    sorted.insert(4, SortKey::new(3, -100));

    assert_eq!(order(&sorted), vec![3, 1, 0, 2, 4]);
    assert_eq!(sorted.len(), 5);
    assert_eq!(sorted.layers_count(), 4);
}

#[test]
fn test_erase_head_middle_and_tail() {
    let mut sorted = SortedSprites::new(8);
    for index in 0..5 {
        sorted.insert(index, SortKey::new(2, 0));
    }

    sorted.erase(2);
    assert_eq!(order(&sorted), vec![0, 1, 3, 4]);
    sorted.erase(0);
    assert_eq!(order(&sorted), vec![1, 3, 4]);
    sorted.erase(4);
    assert_eq!(order(&sorted), vec![1, 3]);
    assert!(!sorted.contains(4));

    // The slot can be inserted again, and goes behind its layer
    sorted.insert(0, SortKey::new(2, 0));
    assert_eq!(order(&sorted), vec![1, 3, 0]);
    // Iterating again without changes gives the same sequence
    assert_eq!(order(&sorted), order(&sorted));
}

/// Emptied layers disappear
#[test]
fn test_erase_last_of_layer() {
    let mut sorted = SortedSprites::new(4);
    sorted.insert(0, SortKey::new(0, 1));
    sorted.insert(1, SortKey::new(0, 2));
    sorted.erase(0);
    assert_eq!(sorted.layers_count(), 1);
    sorted.erase(1);
    assert_eq!(sorted.layers_count(), 0);
    assert_eq!(sorted.len(), 0);
    assert_eq!(sorted.iter().next(), None);
}

#[test]
fn test_reorder() {
    let mut sorted = SortedSprites::new(4);
    sorted.insert(0, SortKey::new(1, 0));
    sorted.insert(1, SortKey::new(1, 0));
    sorted.insert(2, SortKey::new(1, 0));

    // Same key: stays where it is
    sorted.reorder(0, SortKey::new(1, 0));
    assert_eq!(order(&sorted), vec![0, 1, 2]);

    sorted.reorder(1, SortKey::new(0, 7));
    assert_eq!(order(&sorted), vec![1, 0, 2]);
    assert_eq!(sorted.key(1), SortKey::new(0, 7));

    // Moving back puts it at the end of its old layer
    sorted.reorder(1, SortKey::new(1, 0));
    assert_eq!(order(&sorted), vec![0, 2, 1]);
    assert_eq!(sorted.len(), 3);
}

#[test]
#[should_panic(expected = "already sorted")]
fn test_double_insert() {
    let mut sorted = SortedSprites::new(2);
    sorted.insert(0, SortKey::new(0, 0));
    sorted.insert(0, SortKey::new(1, 0));
}
