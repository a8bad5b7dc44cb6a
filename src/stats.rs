//! Read-only occupancy reports for both table engines.
//!
//! The `Display` form of each report is the text returned by the tables'
//! `get_statistics` methods. It is meant for people, nothing parses it.

use core::fmt;

/// Bucket occupancy of an [`OpenAddressingTable`](crate::OpenAddressingTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenAddressingStats {
    /// Number of slots in the table.
    pub total_buckets: usize,
    /// Slots that have never been used, or were freed by the tombstone
    /// shortcut.
    pub free_buckets: usize,
    /// Tombstones left behind by removals.
    pub deleted_buckets: usize,
    /// Used slots sitting in their home bucket.
    pub correctly_placed_buckets: usize,
    /// Used slots displaced from their home bucket by a collision.
    pub misplaced_buckets: usize,
}

impl OpenAddressingStats {
    /// Number of slots holding a value.
    pub fn used_buckets(&self) -> usize {
        self.correctly_placed_buckets + self.misplaced_buckets
    }
}

impl fmt::Display for OpenAddressingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total buckets: {}", self.total_buckets)?;
        writeln!(f, "Used buckets: {}", self.used_buckets())?;
        writeln!(f, "Correctly placed buckets: {}", self.correctly_placed_buckets)?;
        writeln!(f, "Misplaced buckets: {}", self.misplaced_buckets)?;
        writeln!(f, "Deleted buckets: {}", self.deleted_buckets)?;
        writeln!(f, "Free buckets: {}", self.free_buckets)
    }
}

/// Bucket and overflow-pool occupancy of a
/// [`ChainingTable`](crate::ChainingTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainingStats {
    /// Number of primary buckets.
    pub total_buckets: usize,
    /// Primary buckets holding no entry.
    pub free_buckets: usize,
    /// Primary buckets holding an entry.
    pub used_buckets: usize,
    /// Entries living in overflow chains, summed over all buckets.
    pub collisions: usize,
    /// Nodes ever allocated in the overflow pool, linked or free.
    pub pool_nodes: usize,
    /// Overflow nodes waiting on the free list.
    pub free_nodes: usize,
    /// Length of the longest overflow chain.
    pub longest_chain: usize,
}

impl ChainingStats {
    /// Number of stored entries, primary and overflow.
    pub fn total_values(&self) -> usize {
        self.used_buckets + self.collisions
    }
}

impl fmt::Display for ChainingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total buckets: {}", self.total_buckets)?;
        writeln!(f, "Total values: {}", self.total_values())?;
        writeln!(f, "Used buckets: {}", self.used_buckets)?;
        writeln!(f, "Free buckets: {}", self.free_buckets)?;
        writeln!(f, "Collisions: {}", self.collisions)?;
        writeln!(f, "Overflow pool nodes: {}", self.pool_nodes)?;
        writeln!(f, "Free pool nodes: {}", self.free_nodes)?;
        writeln!(f, "Longest chain: {}", self.longest_chain)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        impl OpenAddressingStats {
            /// Pretty-print the statistics to stdout.
            pub fn print(&self) {
                println!("=== Open-Addressing Table Statistics ===");
                print!("{self}");
                println!(
                    "Load: {:.2}% used, {:.2}% tombstones",
                    percent(self.used_buckets(), self.total_buckets),
                    percent(self.deleted_buckets, self.total_buckets)
                );
            }
        }

        impl ChainingStats {
            /// Pretty-print the statistics to stdout.
            pub fn print(&self) {
                println!("=== Chaining Table Statistics ===");
                print!("{self}");
                println!(
                    "Load: {:.2}% of buckets used, {:.2} values per bucket",
                    percent(self.used_buckets, self.total_buckets),
                    if self.total_buckets == 0 {
                        0.0
                    } else {
                        self.total_values() as f64 / self.total_buckets as f64
                    }
                );
            }
        }

        fn percent(part: usize, whole: usize) -> f64 {
            if whole == 0 {
                0.0
            } else {
                part as f64 / whole as f64 * 100.0
            }
        }
    }
}

/// Pretty-prints a histogram horizontally using stdout.
///
/// Row `i` is labelled `i` and shows `hist[i]` as a bar scaled to the largest
/// bin.
#[cfg(all(feature = "std", any(test, feature = "stats")))]
pub fn print_histogram(title: &str, hist: &[usize]) {
    let max = hist.iter().copied().max().unwrap_or(0);
    if max == 0 {
        println!("{title}: empty");
        return;
    }

    let max_bar = 60usize;
    let total_units = max_bar * 8;
    println!("{title} ({} entries):", hist.iter().sum::<usize>());

    let make_bar = |count: usize| -> alloc::string::String {
        if count == 0 {
            return alloc::string::String::new();
        }
        let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
        let mut bar = "█".repeat(units / 8);
        let partial = match units % 8 {
            1 => Some('▏'),
            2 => Some('▎'),
            3 => Some('▍'),
            4 => Some('▌'),
            5 => Some('▋'),
            6 => Some('▊'),
            7 => Some('▉'),
            _ => None,
        };
        bar.extend(partial);
        bar
    };

    let width = hist.len().saturating_sub(1).to_string().len().max(2);
    for (i, &count) in hist.iter().enumerate() {
        println!("{:>width$} | {} ({})", i, make_bar(count), count);
    }
}
