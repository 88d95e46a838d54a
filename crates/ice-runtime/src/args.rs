//! Argument arrays and argument sequences.
//!
//! The runtime consumes recognised options from the process arguments. Two
//! representations take part: the caller's argument array, an `argc` count
//! plus a slot buffer where `None` plays the null terminator, and a plain
//! `Vec<String>` that loaders edit freely. [`string_seq_to_args`] rewrites the
//! array so its live prefix matches an edited sequence.

use std::ffi::OsString;
use std::iter;

/// Copies the first `argc` slots of `argv` into a sequence.
///
/// Slots beyond `argv.len()` are never read. An empty slot inside the live
/// prefix becomes an empty string.
#[must_use]
pub fn args_to_string_seq(argc: usize, argv: &[Option<String>]) -> Vec<String> {
    argv.iter()
        .take(argc)
        .map(|slot| slot.clone().unwrap_or_default())
        .collect()
}

/// Compacts `argv` in place so that its live prefix matches `args`.
///
/// Slots are matched against `args` by text, left to right, so duplicate
/// tokens are consumed in order. Unmatched slots are removed and the slots
/// after them shift left, preserving the relative order of the survivors.
/// `argc` is decremented once per removal.
///
/// The null sentinel `argv[argc] = None` is written only when something was
/// removed: an unmodified array may have no spare slot after its last token.
pub fn string_seq_to_args(args: &[String], argc: &mut usize, argv: &mut [Option<String>]) {
    let original = (*argc).min(argv.len());
    let live: Vec<Option<&str>> = argv
        .iter()
        .take(original)
        .map(Option::as_deref)
        .collect();
    let keep = retention_mask(&live, args);

    let mut write = 0;
    for (read, retained) in keep.into_iter().enumerate() {
        if !retained {
            continue;
        }
        if read != write {
            argv.swap(write, read);
        }
        write += 1;
    }

    *argc = write;
    if write != original
        && let Some(sentinel) = argv.get_mut(write)
    {
        *sentinel = None;
    }
}

/// Pure form of [`string_seq_to_args`]: returns the tokens of `old` that
/// survive reconciliation against `keep`, in their original order.
#[must_use]
pub fn compact(old: &[String], keep: &[String]) -> Vec<String> {
    let live: Vec<Option<&str>> = old.iter().map(|token| Some(token.as_str())).collect();
    old.iter()
        .zip(retention_mask(&live, keep))
        .filter_map(|(token, retained)| retained.then(|| token.clone()))
        .collect()
}

// Targets produced by removal are subsequences of the array and are matched
// positionally. Anything else falls back to membership matching.
fn retention_mask(live: &[Option<&str>], target: &[String]) -> Vec<bool> {
    let mut expected = target.iter().peekable();
    let positional: Vec<bool> = live
        .iter()
        .map(|slot| match (slot, expected.peek()) {
            (Some(token), Some(next)) if *token == next.as_str() => {
                expected.next();
                true
            }
            _ => false,
        })
        .collect();
    if expected.peek().is_none() {
        return positional;
    }

    live.iter()
        .map(|slot| slot.is_some_and(|token| target.iter().any(|kept| kept == token)))
        .collect()
}

/// Owned argument array with a trailing null sentinel.
///
/// This is the array view handed to the argument-array bootstrap when the
/// caller only holds a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgVector {
    argc: usize,
    argv: Vec<Option<String>>,
}

impl ArgVector {
    /// Builds `argc + 1` slots from `args`, the last one empty.
    #[must_use]
    pub fn new(args: &[String]) -> Self {
        let argv = args
            .iter()
            .cloned()
            .map(Some)
            .chain(iter::once(None))
            .collect();
        Self {
            argc: args.len(),
            argv,
        }
    }

    /// Builds the array from platform arguments, transcoding each token to
    /// UTF-8. Invalid sequences are replaced rather than rejected.
    #[must_use]
    pub fn from_os_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        Self::new(&args)
    }

    /// Number of live arguments.
    #[must_use]
    pub fn argc(&self) -> usize {
        self.argc
    }

    /// All slots, including the sentinel and any stale slots after it.
    #[must_use]
    pub fn argv(&self) -> &[Option<String>] {
        &self.argv
    }

    /// Mutable access to the count and the slots, in the shape expected by
    /// [`string_seq_to_args`] and the argument-array bootstrap.
    pub fn parts_mut(&mut self) -> (&mut usize, &mut [Option<String>]) {
        (&mut self.argc, &mut self.argv)
    }

    /// Copies the live prefix into a sequence.
    #[must_use]
    pub fn to_sequence(&self) -> Vec<String> {
        args_to_string_seq(self.argc, &self.argv)
    }

    /// Applies [`string_seq_to_args`] to this array.
    pub fn reconcile(&mut self, args: &[String]) {
        string_seq_to_args(args, &mut self.argc, &mut self.argv);
    }
}
