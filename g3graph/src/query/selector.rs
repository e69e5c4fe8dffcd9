/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use g3_histogram::Quantile;

/// Indexes into a percentile table, as given by the `p` query parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PercentileSelector {
    indexes: Vec<usize>,
}

impl PercentileSelector {
    /// Parse a comma separated index list against a table of `table_len`
    /// entries.
    ///
    /// Entries that are not numbers or fall outside of the table are dropped.
    /// Order and duplicates are kept.
    pub fn parse(s: &str, table_len: usize) -> Self {
        let indexes = s
            .split(',')
            .filter_map(|p| usize::from_str(p.trim()).ok())
            .filter(|i| *i < table_len)
            .collect();
        PercentileSelector { indexes }
    }

    #[inline]
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    pub fn select<'a>(&'a self, table: &'a [Quantile]) -> impl Iterator<Item = &'a Quantile> {
        self.indexes.iter().filter_map(|i| table.get(*i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let s = PercentileSelector::parse("0,2", 8);
        assert_eq!(s.indexes(), &[0, 2]);

        let s = PercentileSelector::parse(" 7 , 1", 8);
        assert_eq!(s.indexes(), &[7, 1]);

        let s = PercentileSelector::parse("3,3", 8);
        assert_eq!(s.indexes(), &[3, 3]);
    }

    #[test]
    fn parse_malformed() {
        let s = PercentileSelector::parse("1,x,8,-1,,2.5,4", 8);
        assert_eq!(s.indexes(), &[1, 4]);

        assert!(PercentileSelector::parse("", 8).indexes().is_empty());
        assert!(PercentileSelector::parse("0", 0).indexes().is_empty());
    }

    #[test]
    fn select() {
        let table = [Quantile::PCT50, Quantile::PCT90, Quantile::PCT99];
        let s = PercentileSelector::parse("2,0", table.len());
        let picked: Vec<&Quantile> = s.select(&table).collect();
        assert_eq!(picked, vec![&Quantile::PCT99, &Quantile::PCT50]);
    }
}
