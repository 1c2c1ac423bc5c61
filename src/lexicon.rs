// Copyright (C) 2020-2026 Andy Kurnia.

//! The dictionary: a kwg holding a dawg for lookups and a gaddag for move
//! generation, built once and read-only afterwards.

use super::{alphabet, build, error::EngineError, kwg};
use std::sync::Arc;
use std::time::{Duration, Instant};

// words normalized per scheduler yield in build_async.
const BUILD_CHUNK_LEN: usize = 4096;

/// Accumulates words for a [`Lexicon`]. Append-only.
pub struct GaddagBuilder<'a> {
    alphabet: &'a alphabet::Alphabet,
    machine_words: Vec<Box<[u8]>>,
}

impl<'a> GaddagBuilder<'a> {
    pub fn new(alphabet: &'a alphabet::Alphabet) -> Self {
        Self {
            alphabet,
            machine_words: Vec::new(),
        }
    }

    /// Uppercases and appends one word. Empty words and words with tiles
    /// outside the alphabet are rejected.
    pub fn add_word(&mut self, word: &str) -> Result<(), EngineError> {
        match self.alphabet.parse_word(word) {
            Some(machine_word) if !machine_word.is_empty() => {
                self.machine_words.push(machine_word.into_boxed_slice());
                Ok(())
            }
            _ => Err(EngineError::InvalidWord(word.to_string())),
        }
    }

    pub fn add_words<I, S>(&mut self, words: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add_word(word.as_ref())?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.machine_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machine_words.is_empty()
    }

    pub fn build(self) -> Result<Lexicon, EngineError> {
        Lexicon::from_machine_words(self.machine_words)
    }
}

pub struct Lexicon {
    kwg: kwg::Kwg,
    num_words: usize,
}

impl Lexicon {
    /// Builds from a word source. An empty source is an error, never an
    /// empty dictionary.
    pub fn build<I, S>(alphabet: &alphabet::Alphabet, words: I) -> Result<Lexicon, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GaddagBuilder::new(alphabet);
        builder.add_words(words)?;
        builder.build()
    }

    fn from_machine_words(mut machine_words: Vec<Box<[u8]>>) -> Result<Lexicon, EngineError> {
        if machine_words.is_empty() {
            return Err(EngineError::DictionaryUnavailable(
                "word source is empty".into(),
            ));
        }
        let t0 = Instant::now();
        machine_words.sort_unstable();
        machine_words.dedup();
        let bytes = build::build(&machine_words)
            .map_err(|err| EngineError::DictionaryUnavailable(err.to_string()))?;
        let kwg = kwg::Kwg::from_bytes_alloc(&bytes);
        log::info!(
            "built lexicon of {} words into {} nodes in {:?}",
            machine_words.len(),
            kwg.len(),
            t0.elapsed()
        );
        Ok(Lexicon {
            kwg,
            num_words: machine_words.len(),
        })
    }

    /// Normalizes the source in chunks, yielding to the scheduler between
    /// them, then builds on the blocking pool.
    pub async fn build_async(
        alphabet: &alphabet::Alphabet,
        words: Vec<String>,
    ) -> Result<Lexicon, EngineError> {
        let mut builder = GaddagBuilder::new(alphabet);
        for chunk in words.chunks(BUILD_CHUNK_LEN) {
            builder.add_words(chunk)?;
            tokio::task::yield_now().await;
        }
        let machine_words = builder.machine_words;
        tokio::task::spawn_blocking(move || Lexicon::from_machine_words(machine_words))
            .await
            .map_err(|err| EngineError::DictionaryUnavailable(err.to_string()))?
    }

    /// Loads an index saved by [`Lexicon::to_kwg_bytes`].
    pub fn from_kwg_bytes(buf: &[u8]) -> Result<Lexicon, EngineError> {
        let kwg = kwg::Kwg::from_bytes_alloc(buf);
        if buf.len() % 4 != 0 || !kwg.is_well_formed() {
            return Err(EngineError::DictionaryUnavailable(
                "not a kwg file".into(),
            ));
        }
        let mut num_words = 0;
        kwg.for_each_word(|_| num_words += 1);
        if num_words == 0 {
            return Err(EngineError::DictionaryUnavailable(
                "kwg has no words".into(),
            ));
        }
        Ok(Lexicon { kwg, num_words })
    }

    pub fn to_kwg_bytes(&self) -> Vec<u8> {
        self.kwg.to_bytes()
    }

    #[inline(always)]
    pub fn kwg(&self) -> &kwg::Kwg {
        &self.kwg
    }

    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.num_words
    }

    #[inline(always)]
    pub fn is_word(&self, word: &[u8]) -> bool {
        self.kwg.accepts_word(word)
    }

    #[inline(always)]
    pub fn has_split(&self, word: &[u8], idx: usize) -> bool {
        self.kwg.has_split(word, idx)
    }
}

/// Reads a line-oriented word list. Blank lines are skipped.
pub fn read_word_source<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<String>, EngineError> {
    let path = path.as_ref();
    let giant_string = std::fs::read_to_string(path).map_err(|err| {
        EngineError::DictionaryUnavailable(format!("cannot read {}: {}", path.display(), err))
    })?;
    let words = giant_string
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    if words.is_empty() {
        return Err(EngineError::DictionaryUnavailable(format!(
            "{} has no words",
            path.display()
        )));
    }
    Ok(words)
}

/// A lexicon built at most once and shared by every caller. Concurrent
/// callers wait on the same in-flight build. A failed build is not cached.
#[derive(Default)]
pub struct LexiconCell {
    cell: tokio::sync::OnceCell<Arc<Lexicon>>,
}

impl LexiconCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Lexicon>> {
        self.cell.get().cloned()
    }

    pub async fn get_or_build<F, Fut>(
        &self,
        alphabet: &alphabet::Alphabet,
        budget: Duration,
        load_words: F,
    ) -> Result<Arc<Lexicon>, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<String>, EngineError>>,
    {
        self.cell
            .get_or_try_init(move || async move {
                let build = async move {
                    let words = load_words().await?;
                    Lexicon::build_async(alphabet, words).await
                };
                match tokio::time::timeout(budget, build).await {
                    Ok(result) => result.map(Arc::new),
                    Err(_) => {
                        log::warn!("lexicon build exceeded {:?}", budget);
                        Err(EngineError::BuildTimeout(budget))
                    }
                }
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn english() -> alphabet::Alphabet {
        alphabet::make_english_alphabet()
    }

    #[test]
    fn test_build_normalizes_case() {
        let lexicon = Lexicon::build(&english(), ["cat", "AT", "Cats", "CAT"]).unwrap();
        assert_eq!(lexicon.num_words(), 3);
        let alphabet = english();
        assert!(lexicon.is_word(&alphabet.parse_word("CATS").unwrap()));
        assert!(!lexicon.is_word(&alphabet.parse_word("CA").unwrap()));
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = Lexicon::build(&english(), Vec::<String>::new()).err().unwrap();
        assert!(err.is_dictionary_failure());
        let err = Lexicon::build(&english(), ["CAT", ""]).err().unwrap();
        assert!(matches!(err, EngineError::InvalidWord(_)));
        let err = Lexicon::build(&english(), ["DON'T"]).err().unwrap();
        assert!(matches!(err, EngineError::InvalidWord(_)));
    }

    #[test]
    fn test_builder_appends() {
        let alphabet = english();
        let mut builder = GaddagBuilder::new(&alphabet);
        builder.add_word("zoo").unwrap();
        builder.add_words(["ZOOS", "OZ"]).unwrap();
        assert_eq!(builder.len(), 3);
        let lexicon = builder.build().unwrap();
        assert!(lexicon.is_word(&alphabet.parse_word("OZ").unwrap()));
    }

    #[test]
    fn test_kwg_bytes() {
        let lexicon = Lexicon::build(&english(), ["CAT", "AT"]).unwrap();
        let again = Lexicon::from_kwg_bytes(&lexicon.to_kwg_bytes()).unwrap();
        assert_eq!(again.num_words(), 2);
        assert!(Lexicon::from_kwg_bytes(&[]).is_err());
        assert!(Lexicon::from_kwg_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_read_word_source() {
        let dir = std::env::temp_dir().join(format!("lexplay-words-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.txt");
        std::fs::write(&good, "cat\n\n  at \nCATS\n").unwrap();
        assert_eq!(read_word_source(&good).unwrap(), vec!["cat", "at", "CATS"]);
        let blank = dir.join("blank.txt");
        std::fs::write(&blank, "\n \n").unwrap();
        assert!(read_word_source(&blank).unwrap_err().is_dictionary_failure());
        assert!(
            read_word_source(dir.join("missing.txt"))
                .unwrap_err()
                .is_dictionary_failure()
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_build_async() {
        let words = (0..10000)
            .map(|i| format!("A{}", to_letters(i)))
            .collect::<Vec<_>>();
        let lexicon = Lexicon::build_async(&english(), words).await.unwrap();
        assert_eq!(lexicon.num_words(), 10000);
    }

    fn to_letters(mut i: usize) -> String {
        let mut s = String::new();
        loop {
            s.push((b'A' + (i % 26) as u8) as char);
            i /= 26;
            if i == 0 {
                return s;
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cell_builds_once() {
        let cell = Arc::new(LexiconCell::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                cell.get_or_build(&english(), Duration::from_secs(30), || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["CAT".to_string(), "AT".to_string()])
                })
                .await
                .map(|lexicon| lexicon.num_words())
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 2);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cell.get().is_some());
    }

    #[tokio::test]
    async fn test_cell_failure_is_not_cached() {
        let cell = LexiconCell::new();
        let err = cell
            .get_or_build(&english(), Duration::from_secs(30), || async {
                Ok(Vec::new())
            })
            .await
            .err()
            .unwrap();
        assert!(err.is_dictionary_failure());
        assert!(cell.get().is_none());
        let lexicon = cell
            .get_or_build(&english(), Duration::from_secs(30), || async {
                Ok(vec!["OX".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(lexicon.num_words(), 1);
    }

    #[tokio::test]
    async fn test_cell_build_timeout() {
        let cell = LexiconCell::new();
        let err = cell
            .get_or_build(&english(), Duration::from_millis(10), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(vec!["OX".to_string()])
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::BuildTimeout(_)));
        assert!(err.is_dictionary_failure());
    }
}
