//! Weather-themed quote of the day with a persisted per-bucket rotation.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::condition::Bucket;
use crate::model::Quote;
use crate::store::KeyValueStore;

const CLEAR: &[Quote] = &[
    Quote { text: "The sun shines for everyone.", author: "Proverb" },
    Quote { text: "Simplicity is the ultimate sophistication.", author: "L. da Vinci" },
    Quote { text: "Create the light you are looking for.", author: "Anonymous" },
];

const CLOUDS: &[Quote] = &[
    Quote { text: "Above the clouds, the sky is always blue.", author: "Proverb" },
    Quote { text: "Patience: clouds always drift away.", author: "Anonymous" },
    Quote { text: "Our clarity is sometimes born from the shade.", author: "Anonymous" },
];

const FOG: &[Quote] = &[
    Quote { text: "When the road is hazy, go one step at a time.", author: "Anonymous" },
    Quote { text: "Clarity reveals itself along the way.", author: "Anonymous" },
    Quote { text: "Every fog lifts in the end.", author: "Proverb" },
];

const RAIN: &[Quote] = &[
    Quote { text: "Without rain, nothing grows.", author: "Anonymous" },
    Quote { text: "If you want the rainbow, you gotta put up with the rain.", author: "D. Parton" },
    Quote { text: "Every drop prepares a harvest.", author: "Proverb" },
];

const SNOW: &[Quote] = &[
    Quote { text: "Peace sometimes falls like snow.", author: "Anonymous" },
    Quote { text: "Every snowflake has its own shape and fate.", author: "Proverb" },
    Quote { text: "The silence of snow says what matters.", author: "Anonymous" },
];

const THUNDER: &[Quote] = &[
    Quote { text: "Courage is not the absence of fear.", author: "N. Mandela" },
    Quote { text: "Lightning lights up the moment: seize it.", author: "Anonymous" },
    Quote { text: "Storms make strong sailors.", author: "Proverb" },
];

pub fn quotes_for(bucket: Bucket) -> &'static [Quote] {
    match bucket {
        Bucket::Clear => CLEAR,
        Bucket::Clouds => CLOUDS,
        Bucket::Fog => FOG,
        Bucket::Rain => RAIN,
        Bucket::Snow => SNOW,
        Bucket::Thunder => THUNDER,
    }
}

pub fn index_key(bucket: Bucket) -> String {
    format!("quote_idx_{}", bucket.as_str())
}

#[derive(Debug, Clone)]
pub struct QuoteRotator {
    store: Arc<dyn KeyValueStore>,
}

impl QuoteRotator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn bucket_for(code: i32) -> Bucket {
        Bucket::from_code(code)
    }

    /// Returns `"text" — author` for the bucket of `code`.
    ///
    /// The first read of a bucket starts at `(day_of_year - 1) % len`. With
    /// `advance` the index moves one step (wrapping) before the quote is read.
    /// The resulting index is persisted either way.
    pub fn get_quote(&self, date: NaiveDate, code: i32, advance: bool) -> Result<String> {
        let bucket = Self::bucket_for(code);
        let quotes = quotes_for(bucket);
        let len = quotes.len() as i64;
        let key = index_key(bucket);

        let mut idx = match self.store.get_i64(&key)? {
            Some(stored) => stored.rem_euclid(len),
            None => i64::from(date.ordinal0()) % len,
        };
        if advance {
            idx = (idx + 1) % len;
        }

        self.store.put_i64(&key, idx)?;

        Ok(quotes[idx as usize].to_string())
    }
}
