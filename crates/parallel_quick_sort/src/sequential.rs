use std::cmp::Ordering;

#[inline]
pub fn floor_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        usize::BITS as usize - 1 - n.leading_zeros() as usize
    }
}

pub fn insertion_sort_by<T, F>(data: &mut [T], compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    for i in 1..data.len() {
        let mut j = i;
        while j > 0 && compare(&data[j - 1], &data[j]) == Ordering::Greater {
            data.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Fallback for partitions that exhausted their depth budget.
pub fn heap_sort_by<T, F>(data: &mut [T], compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let len = data.len();
    if len < 2 {
        return;
    }

    let mut start = (len - 2) / 2;
    loop {
        sift_down(data, start, len, compare);
        if start == 0 {
            break;
        }
        start -= 1;
    }

    let mut end = len - 1;
    while end > 0 {
        data.swap(0, end);
        sift_down(data, 0, end, compare);
        end -= 1;
    }
}

#[inline]
fn sift_down<T, F>(data: &mut [T], mut root: usize, end: usize, compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    loop {
        let child = root * 2 + 1;
        if child >= end {
            break;
        }

        let mut swap_idx = child;
        if child + 1 < end && compare(&data[child], &data[child + 1]) == Ordering::Less {
            swap_idx = child + 1;
        }

        if compare(&data[root], &data[swap_idx]) != Ordering::Less {
            break;
        }

        data.swap(root, swap_idx);
        root = swap_idx;
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn assert_sorts_like_std(data: &[i64]) {
        let mut expected = data.to_vec();
        expected.sort_unstable();

        let mut actual = data.to_vec();
        insertion_sort_by(&mut actual, &i64::cmp);
        assert_eq!(actual, expected, "impl=insertion_sort input_len={}", data.len());

        let mut actual = data.to_vec();
        heap_sort_by(&mut actual, &i64::cmp);
        assert_eq!(actual, expected, "impl=heap_sort input_len={}", data.len());
    }

    #[test]
    fn floor_log2_known_values() {
        let cases = [(0, 0), (1, 0), (2, 1), (3, 1), (4, 2), (1023, 9), (1024, 10)];
        for (n, expected) in cases {
            assert_eq!(floor_log2(n), expected, "n={n}");
        }
    }

    #[test]
    fn edge_cases() {
        let cases = [
            vec![],
            vec![42],
            vec![1, 2, 3, 4, 5, 6],
            vec![6, 5, 4, 3, 2, 1],
            vec![7; 64],
            vec![i64::MIN, 1, i64::MAX, 0, i64::MAX - 1, -2],
        ];

        for case in &cases {
            assert_sorts_like_std(case);
        }
    }

    #[test]
    fn fixed_seed_random_cases() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        for &size in &[2_usize, 3, 8, 31, 64, 257] {
            let data = (0..size)
                .map(|_| rng.random_range(-100..100))
                .collect::<Vec<i64>>();
            assert_sorts_like_std(&data);
        }
    }

    #[test]
    fn respects_custom_comparator() {
        let mut data = vec![3, 9, 1, 7, 5];
        heap_sort_by(&mut data, &|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(data, vec![9, 7, 5, 3, 1]);

        let mut data = vec![3, 9, 1, 7, 5];
        insertion_sort_by(&mut data, &|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(data, vec![9, 7, 5, 3, 1]);
    }
}
