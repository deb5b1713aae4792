//! Exact pattern matching. Positions and highlights are character indices
//! into the text.

use algoverse_core::{InputShape, StateSnapshot, TraceError, MAX_TEXT_LEN};

use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator, TextFn};
use crate::recorder::{Emission, Recorder};

const RK_BASE: i64 = 256;
const RK_MODULUS: i64 = 101;

pub(crate) fn register(catalog: &mut Catalog) {
    let matchers: [(&'static str, &'static str, TextFn); 3] = [
        ("naive-string-match", "Naive String Matching", naive_string_match),
        ("kmp", "Knuth-Morris-Pratt", kmp),
        ("rabin-karp", "Rabin-Karp", rabin_karp),
    ];
    for (id, name, generate) in matchers {
        catalog.register(AlgorithmDescriptor::new(
            id,
            name,
            Category::String,
            InputShape::Text {
                allow_empty_pattern: false,
                max_len: MAX_TEXT_LEN,
            },
            Generator::Text(generate),
        ));
    }
}

fn matches_outcome(text: &str, pattern: &str, table: &[i64], matches: Vec<usize>) -> Emission {
    let m = pattern.chars().count();
    let description = if matches.is_empty() {
        format!("Pattern \"{}\" does not occur in the text", pattern)
    } else {
        format!(
            "Pattern \"{}\" occurs {} time(s) at {:?}",
            pattern,
            matches.len(),
            matches
        )
    };
    let window = matches.first().copied().unwrap_or(0);
    Emission::outcome(description, StateSnapshot::text(text, pattern, window, table))
        .highlight(matches.iter().flat_map(|&s| s..s + m))
        .annotate("found", !matches.is_empty())
        .annotate("count", matches.len())
        .annotate("matches", matches)
}

/// Tries every alignment and compares left to right.
pub fn naive_string_match(
    rec: &mut Recorder,
    text: &str,
    pattern: &str,
) -> Result<Emission, TraceError> {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    let (n, m) = (t.len(), p.len());
    let mut matches = Vec::new();

    rec.emit(
        Emission::start(
            format!("Searching for \"{}\" in text of length {}", pattern, n),
            StateSnapshot::text(text, pattern, 0, &[]),
        )
        .annotate("n", n)
        .annotate("m", m),
    )?;

    if m <= n {
        for s in 0..=n - m {
            rec.emit(
                Emission::decide(
                    format!("Aligning pattern at position {}", s),
                    StateSnapshot::text(text, pattern, s, &[]),
                )
                .highlight(s..s + m)
                .annotate("shift", s),
            )?;
            let mut j = 0;
            while j < m {
                rec.emit(
                    Emission::compare(
                        format!("Comparing text[{}] = '{}' with pattern[{}] = '{}'", s + j, t[s + j], j, p[j]),
                        StateSnapshot::text(text, pattern, s, &[]),
                    )
                    .highlight([s + j]),
                )?;
                if t[s + j] != p[j] {
                    break;
                }
                j += 1;
            }
            if j == m {
                matches.push(s);
                rec.emit(
                    Emission::decide(
                        format!("Match at position {}", s),
                        StateSnapshot::text(text, pattern, s, &[]),
                    )
                    .highlight(s..s + m)
                    .annotate("matches", matches.clone()),
                )?;
            }
        }
    }

    Ok(matches_outcome(text, pattern, &[], matches))
}

/// Knuth-Morris-Pratt. The snapshot table holds the longest proper
/// prefix-suffix (failure function) of the pattern.
pub fn kmp(rec: &mut Recorder, text: &str, pattern: &str) -> Result<Emission, TraceError> {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    let (n, m) = (t.len(), p.len());
    let mut lps = vec![0i64; m];
    let mut matches = Vec::new();

    rec.emit(
        Emission::start(
            format!("Building failure table for \"{}\"", pattern),
            StateSnapshot::text(text, pattern, 0, &lps),
        )
        .annotate("m", m),
    )?;

    let mut len = 0usize;
    let mut i = 1;
    while i < m {
        rec.emit(
            Emission::compare(
                format!("Comparing pattern[{}] = '{}' with pattern[{}] = '{}'", i, p[i], len, p[len]),
                StateSnapshot::text(text, pattern, 0, &lps),
            )
            .annotate("i", i)
            .annotate("len", len),
        )?;
        if p[i] == p[len] {
            len += 1;
            lps[i] = len as i64;
            rec.emit(
                Emission::mutate(
                    format!("lps[{}] = {}", i, len),
                    StateSnapshot::text(text, pattern, 0, &lps),
                )
                .annotate("i", i),
            )?;
            i += 1;
        } else if len > 0 {
            len = lps[len - 1] as usize;
            rec.emit(Emission::decide(
                format!("Mismatch, falling back to prefix length {}", len),
                StateSnapshot::text(text, pattern, 0, &lps),
            ))?;
        } else {
            rec.emit(
                Emission::mutate(
                    format!("lps[{}] = 0", i),
                    StateSnapshot::text(text, pattern, 0, &lps),
                )
                .annotate("i", i),
            )?;
            i += 1;
        }
    }

    rec.emit(
        Emission::decide(
            format!("Failure table complete: {:?}", lps),
            StateSnapshot::text(text, pattern, 0, &lps),
        )
        .annotate("lps", lps.clone()),
    )?;

    // `i` walks the text, `j` the pattern; the window starts at i - j.
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && m > 0 {
        let window = i - j;
        rec.emit(
            Emission::compare(
                format!("Comparing text[{}] = '{}' with pattern[{}] = '{}'", i, t[i], j, p[j]),
                StateSnapshot::text(text, pattern, window, &lps),
            )
            .highlight([i]),
        )?;
        if t[i] == p[j] {
            i += 1;
            j += 1;
            if j == m {
                let start = i - m;
                matches.push(start);
                rec.emit(
                    Emission::decide(
                        format!("Match at position {}", start),
                        StateSnapshot::text(text, pattern, start, &lps),
                    )
                    .highlight(start..i)
                    .annotate("matches", matches.clone()),
                )?;
                j = lps[j - 1] as usize;
            }
        } else if j > 0 {
            j = lps[j - 1] as usize;
            rec.emit(
                Emission::decide(
                    format!("Mismatch, shifting pattern to position {}", i - j),
                    StateSnapshot::text(text, pattern, i - j, &lps),
                )
                .annotate("j", j),
            )?;
        } else {
            i += 1;
        }
    }

    Ok(matches_outcome(text, pattern, &lps, matches))
}

fn code(c: char) -> i64 {
    i64::from(u32::from(c))
}

/// Rabin-Karp with a rolling hash (base 256, modulus 101). The snapshot
/// table is `[pattern hash, window hash]`; hash hits are verified
/// character by character.
pub fn rabin_karp(rec: &mut Recorder, text: &str, pattern: &str) -> Result<Emission, TraceError> {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    let (n, m) = (t.len(), p.len());
    let mut matches = Vec::new();

    rec.emit(
        Emission::start(
            format!("Searching for \"{}\" with rolling hashes", pattern),
            StateSnapshot::text(text, pattern, 0, &[]),
        )
        .annotate("base", RK_BASE)
        .annotate("modulus", RK_MODULUS),
    )?;

    if m == 0 || m > n {
        return Ok(matches_outcome(text, pattern, &[], matches));
    }

    // high = base^(m-1) mod q
    let mut high = 1;
    for _ in 1..m {
        high = high * RK_BASE % RK_MODULUS;
    }
    let hash = |chars: &[char]| {
        chars
            .iter()
            .fold(0i64, |h, &c| (h * RK_BASE + code(c)).rem_euclid(RK_MODULUS))
    };
    let target = hash(&p);
    let mut window_hash = hash(&t[..m]);

    rec.emit(
        Emission::mutate(
            format!("Pattern hash {}, first window hash {}", target, window_hash),
            StateSnapshot::text(text, pattern, 0, &[target, window_hash]),
        )
        .highlight(0..m),
    )?;

    for s in 0..=n - m {
        let table = [target, window_hash];
        rec.emit(
            Emission::compare(
                format!("Window {} hash {} vs pattern hash {}", s, window_hash, target),
                StateSnapshot::text(text, pattern, s, &table),
            )
            .highlight(s..s + m),
        )?;

        if window_hash == target {
            let verified = t[s..s + m] == p[..];
            rec.emit(
                Emission::decide(
                    if verified {
                        format!("Hash hit at {} verified, match", s)
                    } else {
                        format!("Hash hit at {} is a spurious collision", s)
                    },
                    StateSnapshot::text(text, pattern, s, &table),
                )
                .highlight(s..s + m)
                .annotate("verified", verified),
            )?;
            if verified {
                matches.push(s);
            }
        }

        if s + m < n {
            let out = code(t[s]);
            let inc = code(t[s + m]);
            window_hash = ((window_hash - out * high) * RK_BASE + inc).rem_euclid(RK_MODULUS);
            rec.emit(
                Emission::mutate(
                    format!("Rolled hash: dropped '{}', added '{}', hash {}", t[s], t[s + m], window_hash),
                    StateSnapshot::text(text, pattern, s + 1, &[target, window_hash]),
                )
                .highlight(s + 1..s + m + 1),
            )?;
        }
    }

    Ok(matches_outcome(text, pattern, &[target, window_hash], matches))
}
