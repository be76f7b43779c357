use crate::domain::{
    Changelog, ChangelogEntry, ChangelogSection, CommitRecord, SectionKind, SemanticVersion,
};

/// Groups commit records into changelog sections
///
/// Section order is fixed. Entries keep the order of the input records, and a
/// breaking commit is listed both under Breaking Changes and in its own section.
pub struct ChangelogBuilder;

impl ChangelogBuilder {
    pub fn build(records: &[CommitRecord], version: &SemanticVersion) -> Changelog {
        let mut buckets: Vec<(SectionKind, Vec<ChangelogEntry>)> = SectionKind::ORDER
            .iter()
            .map(|kind| (*kind, Vec::new()))
            .collect();

        for record in records {
            if record.breaking {
                push(&mut buckets, SectionKind::BreakingChanges, entry(record, true));
            }
            push(
                &mut buckets,
                SectionKind::primary_for(record.commit_type),
                entry(record, false),
            );
        }

        let sections = buckets
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(kind, entries)| ChangelogSection {
                kind,
                title: kind.title(),
                entries,
            })
            .collect();

        Changelog {
            version: version.clone(),
            date: records.iter().map(|r| r.timestamp).max().map(|t| t.date_naive()),
            sections,
        }
    }
}

fn push(buckets: &mut [(SectionKind, Vec<ChangelogEntry>)], kind: SectionKind, entry: ChangelogEntry) {
    if let Some((_, entries)) = buckets.iter_mut().find(|(k, _)| *k == kind) {
        entries.push(entry);
    }
}

fn entry(record: &CommitRecord, with_note: bool) -> ChangelogEntry {
    ChangelogEntry {
        commit_type: record.commit_type,
        scope: record.scope,
        subject: record.subject.clone(),
        revision_id: record.revision_id.clone(),
        note: if with_note {
            record.breaking_note().map(str::to_string)
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventional::CommitParser;
    use crate::domain::{CommitType, RawCommit};
    use chrono::{TimeZone, Utc};

    fn records(messages: &[&str]) -> Vec<CommitRecord> {
        let raw: Vec<RawCommit> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                RawCommit::new(
                    *m,
                    format!("rev{}", i),
                    Utc.with_ymd_and_hms(2024, 3, 1 + i as u32, 9, 0, 0).unwrap(),
                )
            })
            .collect();
        let outcome = CommitParser::new().unwrap().parse(&raw);
        assert!(outcome.rejected.is_empty(), "{:?}", outcome.rejected);
        outcome.records
    }

    fn kinds(changelog: &Changelog) -> Vec<SectionKind> {
        changelog.sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_feature_and_fix_sections() {
        let recs = records(&["fix(core): correct cache key", "feat(api): add bulk endpoint"]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(1, 3, 0));
        assert_eq!(kinds(&changelog), vec![SectionKind::Features, SectionKind::Fixes]);
        assert_eq!(changelog.section(SectionKind::Features).unwrap().entries.len(), 1);
        assert_eq!(changelog.section(SectionKind::Fixes).unwrap().entries.len(), 1);
    }

    #[test]
    fn test_breaking_entry_is_duplicated() {
        let recs = records(&["feat(core)!: remove legacy handler"]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(3, 0, 0));
        assert_eq!(
            kinds(&changelog),
            vec![SectionKind::BreakingChanges, SectionKind::Features]
        );
        let breaking = &changelog.section(SectionKind::BreakingChanges).unwrap().entries[0];
        let feature = &changelog.section(SectionKind::Features).unwrap().entries[0];
        assert_eq!(breaking.revision_id, feature.revision_id);
        assert_eq!(breaking.subject, "remove legacy handler");
    }

    #[test]
    fn test_breaking_note_only_in_breaking_section() {
        let recs = records(&["fix(api): rename field\n\nBREAKING CHANGE: `id` is now `uid`"]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(2, 0, 0));
        let breaking = &changelog.section(SectionKind::BreakingChanges).unwrap().entries[0];
        let fix = &changelog.section(SectionKind::Fixes).unwrap().entries[0];
        assert_eq!(breaking.note.as_deref(), Some("`id` is now `uid`"));
        assert_eq!(fix.note, None);
    }

    #[test]
    fn test_other_section_keeps_types_and_order() {
        let recs = records(&[
            "docs: update readme",
            "perf(db): batch inserts",
            "chore(deps): bump regex",
            "refactor(core): split module",
            "ci: cache cargo registry",
        ]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(1, 0, 1));
        assert_eq!(kinds(&changelog), vec![SectionKind::Performance, SectionKind::Other]);
        let other: Vec<CommitType> = changelog
            .section(SectionKind::Other)
            .unwrap()
            .entries
            .iter()
            .map(|e| e.commit_type)
            .collect();
        assert_eq!(
            other,
            vec![CommitType::Docs, CommitType::Chore, CommitType::Refactor, CommitType::Ci]
        );
    }

    #[test]
    fn test_every_record_has_one_primary_entry() {
        let recs = records(&[
            "feat(api)!: new response format",
            "feat(auth): add oauth2",
            "fix: various bugs",
            "test: cover parser",
            "style: format code",
        ]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(2, 0, 0));
        let breaking = recs.iter().filter(|r| r.breaking).count();
        assert_eq!(changelog.entry_count(), recs.len() + breaking);
        for record in &recs {
            let primary = SectionKind::primary_for(record.commit_type);
            let hits = changelog
                .section(primary)
                .unwrap()
                .entries
                .iter()
                .filter(|e| e.revision_id == record.revision_id)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_empty_batch() {
        let changelog = ChangelogBuilder::build(&[], &SemanticVersion::new(1, 0, 0));
        assert!(changelog.is_empty());
        assert_eq!(changelog.date, None);
    }

    #[test]
    fn test_date_is_newest_commit() {
        let recs = records(&["fix: one", "fix: two", "fix: three"]);
        let changelog = ChangelogBuilder::build(&recs, &SemanticVersion::new(0, 1, 1));
        assert_eq!(changelog.date, chrono::NaiveDate::from_ymd_opt(2024, 3, 3));
    }
}
