//! Bundled trace source: sorts a random array and prints every intermediate
//! state, one whitespace-separated line per snapshot.

use std::io::{self, Write};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sort_visualiser_core::Algorithm;

const MAX_VALUE: i64 = 200;

/// Prints a full trace for `algorithm` over `len` random values in
/// `1..=200`.
pub fn emit_trace<W: Write>(
    algorithm: Algorithm,
    len: usize,
    seed: u64,
    out: &mut W,
) -> io::Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values: Vec<i64> = (0..len).map(|_| rng.random_range(1..=MAX_VALUE)).collect();
    let mut printer = Printer { out };

    printer.line(&values)?;
    match algorithm {
        Algorithm::Bubble => bubble_sort(&mut values, &mut printer),
        Algorithm::Merge => {
            let last = values.len().saturating_sub(1);
            merge_sort(&mut values, 0, last, &mut printer)
        }
        Algorithm::Quick => {
            let last = values.len().saturating_sub(1);
            quick_sort(&mut values, 0, last, &mut printer)
        }
    }?;
    printer.out.flush()
}

struct Printer<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> Printer<'_, W> {
    fn line(&mut self, values: &[i64]) -> io::Result<()> {
        let line: Vec<String> = values.iter().map(i64::to_string).collect();
        writeln!(self.out, "{}", line.join(" "))
    }
}

fn bubble_sort<W: Write>(values: &mut [i64], printer: &mut Printer<'_, W>) -> io::Result<()> {
    let n = values.len();
    for pass in 0..n {
        let mut swapped = false;
        for j in 0..n - 1 - pass {
            if values[j] > values[j + 1] {
                values.swap(j, j + 1);
                printer.line(values)?;
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
    Ok(())
}

/// Top-down merge sort over the inclusive range, printing after each merge.
fn merge_sort<W: Write>(
    values: &mut [i64],
    left: usize,
    right: usize,
    printer: &mut Printer<'_, W>,
) -> io::Result<()> {
    if left >= right {
        return Ok(());
    }
    let middle = left + (right - left) / 2;
    merge_sort(values, left, middle, printer)?;
    merge_sort(values, middle + 1, right, printer)?;
    merge(values, left, middle, right);
    printer.line(values)
}

fn merge(values: &mut [i64], left: usize, middle: usize, right: usize) {
    let lower = values[left..=middle].to_vec();
    let upper = values[middle + 1..=right].to_vec();
    let (mut i, mut j) = (0, 0);
    for slot in &mut values[left..=right] {
        let take_lower = j >= upper.len() || (i < lower.len() && lower[i] <= upper[j]);
        if take_lower {
            *slot = lower[i];
            i += 1;
        } else {
            *slot = upper[j];
            j += 1;
        }
    }
}

/// Quick sort with a median-of-three pivot and Lomuto partitioning,
/// printing after each partition.
fn quick_sort<W: Write>(
    values: &mut [i64],
    left: usize,
    right: usize,
    printer: &mut Printer<'_, W>,
) -> io::Result<()> {
    if left >= right {
        return Ok(());
    }
    let pivot = partition(values, left, right);
    printer.line(values)?;
    if pivot > left {
        quick_sort(values, left, pivot - 1, printer)?;
    }
    quick_sort(values, pivot + 1, right, printer)
}

fn partition(values: &mut [i64], left: usize, right: usize) -> usize {
    let chosen = median_of_three(values, left, right);
    values.swap(left, chosen);
    let pivot = values[left];
    let mut store = left;
    for j in left + 1..=right {
        if values[j] <= pivot {
            store += 1;
            values.swap(store, j);
        }
    }
    values.swap(left, store);
    store
}

fn median_of_three(values: &[i64], left: usize, right: usize) -> usize {
    let middle = left + (right - left) / 2;
    let (a, b, c) = (values[left], values[middle], values[right]);
    if (a > b) != (a > c) {
        left
    } else if (b > a) != (b > c) {
        middle
    } else {
        right
    }
}
