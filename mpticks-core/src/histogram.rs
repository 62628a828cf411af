use mpticks_common::{validate_domain, DomainConfig, MpticksError, Result};
use serde::Serialize;
use std::fmt;
use std::io::Write;

const FILL: char = '#';
const DISPLAY_BAR_WIDTH: usize = 20;

/// One inclusive integer range of a [`LinearHistogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub min: i64,
    pub max: i64,
    pub count: u64,
}

impl Bucket {
    pub fn label(&self) -> String {
        if self.min == self.max {
            self.min.to_string()
        } else {
            format!("{}-{}", self.min, self.max)
        }
    }
}

/// Linear histogram over the inclusive domain `[min, max]`.
///
/// Bucket widths are `(max - min + 1) / n` rounded down at each edge, so some
/// buckets hold one more integer than others. Values outside the domain are
/// counted as underflow or overflow. Not synchronized: callers feeding one
/// histogram from several producers must serialize `add`.
#[derive(Debug, Clone, Serialize)]
pub struct LinearHistogram {
    step: f64,
    buckets: Vec<Bucket>,
    underflow: u64,
    overflow: u64,
}

impl LinearHistogram {
    pub fn new(min: i64, max: i64, bucket_count: usize) -> Result<Self> {
        validate_domain(min, max, bucket_count)?;
        let size = max as i128 - min as i128 + 1;
        let n = bucket_count as i128;
        // floor(i * step) computed exactly, so the last edge lands on max + 1
        let edge = |i: i128| min as i128 + i * size / n;
        let buckets = (0..n)
            .map(|i| Bucket {
                min: edge(i) as i64,
                max: (edge(i + 1) - 1) as i64,
                count: 0,
            })
            .collect();
        Ok(Self {
            step: size as f64 / bucket_count as f64,
            buckets,
            underflow: 0,
            overflow: 0,
        })
    }

    pub fn from_domain(domain: &DomainConfig) -> Result<Self> {
        Self::new(domain.min, domain.max, domain.buckets)
    }

    pub fn min(&self) -> i64 {
        self.first().min
    }

    pub fn max(&self) -> i64 {
        self.last().max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// number of values added, in or out of range
    pub fn total(&self) -> u64 {
        self.underflow + self.overflow + self.buckets.iter().map(|b| b.count).sum::<u64>()
    }

    pub fn add(&mut self, value: i64) {
        if value < self.min() {
            self.underflow += 1;
        } else if value > self.max() {
            self.overflow += 1;
        } else {
            let i = self.bucket_index(value);
            self.buckets[i].count += 1;
        }
    }

    // The index computed from step alone can be off by one: for [4, 50] with
    // 10 buckets the step is 4.7 and bucket 2 starts at trunc(13.4) = 13, but
    // (13 - 4) / 4.7 = 1.91. The stored edges are authoritative.
    fn bucket_index(&self, value: i64) -> usize {
        let offset = (value as i128 - self.min() as i128) as f64;
        let mut i = ((offset / self.step) as usize).min(self.buckets.len() - 1);
        if value < self.buckets[i].min {
            i -= 1;
        } else if value > self.buckets[i].max {
            i += 1;
        }
        i
    }

    /// Writes one `label |bar` line per row to `sink`.
    ///
    /// `bar_width` is the bar length of the fullest bucket; underflow and
    /// overflow are scaled against the same reference and may run longer.
    /// A `label_width` of 0 sizes the label column to fit two bounds and a dash.
    pub fn render<W: Write>(&self, sink: &mut W, label_width: usize, bar_width: usize) -> Result<()> {
        let lw = self.resolve_label_width(label_width);
        let max_count = self.max_bucket_count();
        for (label, count) in self.rows() {
            let line = format_row(&label, count, max_count, lw, bar_width);
            sink.write_all(line.as_bytes()).map_err(MpticksError::WriteFailure)?;
        }
        Ok(())
    }

    pub fn render_to_string(&self, label_width: usize, bar_width: usize) -> String {
        let lw = self.resolve_label_width(label_width);
        let max_count = self.max_bucket_count();
        self.rows()
            .map(|(label, count)| format_row(&label, count, max_count, lw, bar_width))
            .collect()
    }

    fn resolve_label_width(&self, label_width: usize) -> usize {
        if label_width > 0 {
            return label_width;
        }
        let digits = (self.max() as i128 + 1).to_string().len();
        2 * digits + 1
    }

    fn max_bucket_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    fn rows(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        std::iter::once((format!("<{}", self.min()), self.underflow))
            .chain(self.buckets.iter().map(|b| (b.label(), b.count)))
            .chain(std::iter::once((format!(">{}", self.max()), self.overflow)))
    }

    fn first(&self) -> &Bucket {
        &self.buckets[0]
    }

    fn last(&self) -> &Bucket {
        &self.buckets[self.buckets.len() - 1]
    }
}

impl Extend<i64> for LinearHistogram {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, values: I) {
        for v in values {
            self.add(v);
        }
    }
}

impl fmt::Display for LinearHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_to_string(0, DISPLAY_BAR_WIDTH))
    }
}

// an all-empty bucket list scales against 1 so zero counts stay empty
fn bar_len(count: u64, max_count: u64, bar_width: usize) -> usize {
    let reference = max_count.max(1);
    (count as f64 / reference as f64 * bar_width as f64).round() as usize
}

fn format_row(label: &str, count: u64, max_count: u64, label_width: usize, bar_width: usize) -> String {
    let len = bar_len(count, max_count, bar_width);
    let mut bar: String = std::iter::repeat(FILL).take(len).collect();
    if len > 0 {
        bar.push(' ');
        bar.push_str(&count.to_string());
    }
    format!("{label:>label_width$} |{bar}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(h: &LinearHistogram) -> Vec<(i64, i64)> {
        h.buckets().iter().map(|b| (b.min, b.max)).collect()
    }

    fn counts(h: &LinearHistogram) -> Vec<u64> {
        h.buckets().iter().map(|b| b.count).collect()
    }

    #[test]
    fn even_domain() {
        let mut h = LinearHistogram::new(1, 20, 10).unwrap();
        h.extend(0..=21);
        let exp = "   <1 |### 1
  1-2 |##### 2
  3-4 |##### 2
  5-6 |##### 2
  7-8 |##### 2
 9-10 |##### 2
11-12 |##### 2
13-14 |##### 2
15-16 |##### 2
17-18 |##### 2
19-20 |##### 2
  >20 |### 1
";
        assert_eq!(h.render_to_string(0, 5), exp);
        assert_eq!(h.underflow(), 1);
        assert_eq!(h.overflow(), 1);
        assert_eq!(counts(&h), vec![2; 10]);
    }

    #[test]
    fn uneven_domain() {
        let mut h = LinearHistogram::new(1, 10, 3).unwrap();
        h.extend(1..=10);
        assert_eq!(bounds(&h), vec![(1, 3), (4, 6), (7, 10)]);
        assert_eq!(counts(&h), vec![3, 3, 4]);
        let exp = "   <1 |
  1-3 |## 3
  4-6 |## 3
 7-10 |## 4
  >10 |
";
        assert_eq!(h.render_to_string(0, 2), exp);
    }

    #[test]
    fn underflow_only() {
        let mut h = LinearHistogram::new(1, 3, 3).unwrap();
        h.add(0);
        assert_eq!((h.underflow(), h.overflow()), (1, 0));
        assert_eq!(counts(&h), vec![0, 0, 0]);
        let out = h.render_to_string(0, 2);
        assert_eq!(out, " <1 |## 1\n  1 |\n  2 |\n  3 |\n >3 |\n");
    }

    #[test]
    fn underflow_scaled_against_buckets() {
        let mut h = LinearHistogram::new(1, 3, 3).unwrap();
        h.extend([0, 1]);
        let out = h.render_to_string(0, 2);
        assert_eq!(out, " <1 |## 1\n  1 |## 1\n  2 |\n  3 |\n >3 |\n");
    }

    #[test]
    fn single_value_labels() {
        let h = LinearHistogram::new(1, 4, 4).unwrap();
        let labels: Vec<String> = h.buckets().iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn empty_histogram_renders_empty_bars() {
        let h = LinearHistogram::new(0, 100, 5).unwrap();
        let out = h.render_to_string(0, 20);
        assert_eq!(out.lines().count(), 7);
        assert!(out.lines().all(|l| l.ends_with('|')));
    }

    #[test]
    fn overflow_bar_can_exceed_width() {
        let mut h = LinearHistogram::new(0, 9, 2).unwrap();
        h.add(0);
        h.extend([10, 11, 12]);
        let out = h.render_to_string(0, 4);
        assert!(out.contains(" >9 |############ 3\n"), "{out}");
    }

    #[test]
    fn fixed_label_width() {
        let mut h = LinearHistogram::new(1, 4, 2).unwrap();
        h.add(2);
        assert_eq!(h.render_to_string(6, 3), "    <1 |\n   1-2 |### 1\n   3-4 |\n    >4 |\n");
    }

    #[test]
    fn truncated_edges_classify_correctly() {
        // step 4.7: naive division would put 13 into bucket 1
        let mut h = LinearHistogram::new(4, 50, 10).unwrap();
        assert_eq!(h.buckets()[2].min, 13);
        h.add(13);
        assert_eq!(h.buckets()[2].count, 1);
        for v in 4..=50 {
            let mut one = LinearHistogram::new(4, 50, 10).unwrap();
            one.add(v);
            let hit = one.buckets().iter().position(|b| b.count == 1).unwrap();
            let b = one.buckets()[hit];
            assert!(b.min <= v && v <= b.max, "{v} landed in {b:?}");
        }
    }

    #[test]
    fn partition_is_contiguous() {
        for min in [-7i64, 0, 1, 13] {
            for span in 1..=40i64 {
                let max = min + span - 1;
                for n in 1..=span as usize {
                    let h = LinearHistogram::new(min, max, n).unwrap();
                    let b = h.buckets();
                    assert_eq!(b.len(), n);
                    assert_eq!(b[0].min, min);
                    assert_eq!(b[n - 1].max, max);
                    for w in b.windows(2) {
                        assert_eq!(w[0].max + 1, w[1].min, "gap in new({min}, {max}, {n})");
                    }
                    assert!(b.iter().all(|x| x.min <= x.max));
                }
            }
        }
    }

    #[test]
    fn every_value_counted_once() {
        for n in 1..=12usize {
            let mut h = LinearHistogram::new(-5, 30, n).unwrap();
            for v in -10..=40 {
                let before = h.total();
                h.add(v);
                assert_eq!(h.total(), before + 1);
            }
            assert_eq!(h.underflow(), 5);
            assert_eq!(h.overflow(), 10);
            assert_eq!(counts(&h).iter().sum::<u64>(), 36);
            for b in h.buckets() {
                assert_eq!(b.count, (b.max - b.min + 1) as u64);
            }
        }
    }

    #[test]
    fn extreme_domain() {
        let mut h = LinearHistogram::new(i64::MIN, i64::MAX, 4).unwrap();
        h.extend([i64::MIN, -1, 0, i64::MAX]);
        assert_eq!(h.buckets()[0].min, i64::MIN);
        assert_eq!(h.buckets()[3].max, i64::MAX);
        assert_eq!(h.total(), 4);
        assert_eq!((h.underflow(), h.overflow()), (0, 0));
        assert!(h.render_to_string(0, 10).contains(&format!(">{}", i64::MAX)));
    }

    #[test]
    fn rejects_invalid_arguments() {
        assert!(matches!(LinearHistogram::new(5, 4, 1), Err(MpticksError::InvalidArgument(_))));
        assert!(matches!(LinearHistogram::new(0, 10, 0), Err(MpticksError::InvalidArgument(_))));
        assert!(matches!(LinearHistogram::new(1, 2, 3), Err(MpticksError::InvalidArgument(_))));
    }

    #[test]
    fn render_is_idempotent() {
        let mut h = LinearHistogram::new(0, 2500, 10).unwrap();
        h.extend([3, 250, 251, 999, 2500, 2501, -1]);
        let mut a = Vec::new();
        let mut b = Vec::new();
        h.render(&mut a, 0, 20).unwrap();
        h.render(&mut b, 0, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(String::from_utf8(a).unwrap(), h.to_string());
    }

    struct FailAfter(usize);

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.0 == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
            }
            self.0 -= 1;
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_stops_rendering() {
        let h = LinearHistogram::new(1, 10, 3).unwrap();
        let mut sink = FailAfter(2);
        let err = h.render(&mut sink, 0, 10).unwrap_err();
        assert!(matches!(err, MpticksError::WriteFailure(_)));
        assert_eq!(sink.0, 0);
    }
}
