//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! The ratio is `2 * M / T` where `T` is the total number of characters in
//! both strings and `M` the number of characters covered by matching blocks.
//! Matching blocks are found by taking the longest common substring and
//! recursing on the unmatched parts to its left and right.

/// Returns the similarity ratio of `a` and `b`, in `[0.0, 1.0]`.
///
/// Two empty strings are considered identical (`1.0`).
pub fn ratio(a: &str, b: &str) -> f64 {
	let a: Vec<char> = a.chars().collect();
	let b: Vec<char> = b.chars().collect();
	let total = a.len() + b.len();
	if total == 0 {
		return 1.0;
	}

	let matches = matching_characters(&a, &b);
	2.0 * matches as f64 / total as f64
}

/// Sums the sizes of all matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
	let mut matched = 0;
	let mut queue = vec![(0, a.len(), 0, b.len())];

	while let Some((alo, ahi, blo, bhi)) = queue.pop() {
		let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
		if size == 0 {
			continue;
		}
		matched += size;
		if alo < i && blo < j {
			queue.push((alo, i, blo, j));
		}
		if i + size < ahi && j + size < bhi {
			queue.push((i + size, ahi, j + size, bhi));
		}
	}

	matched
}

/// Finds the longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among blocks of equal size, the one starting earliest in `a` wins, then
/// the one starting earliest in `b`. Returns `(start_a, start_b, size)`.
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
	let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
	// previous[j - blo + 1]: common suffix length ending at a[i - 1] and b[j]
	let mut previous = vec![0usize; bhi - blo + 1];

	for i in alo..ahi {
		let mut current = vec![0usize; bhi - blo + 1];
		for j in blo..bhi {
			if a[i] == b[j] {
				let k = previous[j - blo] + 1;
				current[j - blo + 1] = k;
				if k > best_size {
					best_i = i + 1 - k;
					best_j = j + 1 - k;
					best_size = k;
				}
			}
		}
		previous = current;
	}

	(best_i, best_j, best_size)
}
