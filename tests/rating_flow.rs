//! End-to-end rating sessions against a real folder of PNG files.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;

use image_rater::state::progress::DEFAULT_PROGRESS_FILE;
use image_rater::{
    run_session, Config, Decision, DecisionInput, Error, FileOrganizer, FolderLoader,
    FolderOrganizer, ImageId, ImageSet, Pair, Progress, ProgressStore, Result, SessionEnd,
    SessionState, Tier,
};

/// Prefers the image that comes first in `ranking`; pops scripted overrides first
struct ScriptedInput {
    ranking: Vec<&'static str>,
    script: VecDeque<Decision>,
    seen: Vec<Pair>,
    progress: Vec<Progress>,
}

impl ScriptedInput {
    fn new(ranking: Vec<&'static str>) -> Self {
        Self {
            ranking,
            script: VecDeque::new(),
            seen: Vec::new(),
            progress: Vec::new(),
        }
    }

    fn then(mut self, decisions: impl IntoIterator<Item = Decision>) -> Self {
        self.script.extend(decisions);
        self
    }

    fn rank(&self, id: &ImageId) -> usize {
        self.ranking
            .iter()
            .position(|name| *name == id.as_str())
            .unwrap_or(usize::MAX)
    }
}

impl DecisionInput for ScriptedInput {
    fn decide(&mut self, pair: &Pair, progress: Progress, _images: &ImageSet) -> Result<Decision> {
        self.seen.push(pair.clone());
        self.progress.push(progress);
        if let Some(decision) = self.script.pop_front() {
            return Ok(decision);
        }
        Ok(if self.rank(&pair.left) < self.rank(&pair.right) {
            Decision::LeftBetter
        } else {
            Decision::RightBetter
        })
    }
}

fn write_images(dir: &Path, names: &[&str]) {
    for name in names {
        image::RgbImage::new(2, 2).save(dir.join(name)).unwrap();
    }
}

fn unordered(pair: &Pair) -> (ImageId, ImageId) {
    if pair.left < pair.right {
        (pair.left.clone(), pair.right.clone())
    } else {
        (pair.right.clone(), pair.left.clone())
    }
}

fn tier_names(session: &SessionState, tier: u8) -> Vec<String> {
    session
        .assign_tiers()
        .members(Tier::new(tier).unwrap())
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn full_session_ranks_and_organizes() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["A.png", "B.png", "C.png", "D.png"];
    write_images(dir.path(), &names);
    let config = Config::default();

    let report = FolderLoader::from_config(&config).load(dir.path()).unwrap();
    let mut session = SessionState::new(report.images);
    let mut input = ScriptedInput::new(names.to_vec());
    let mut organizer = FolderOrganizer::new(dir.path(), &config);

    let end = run_session(&mut session, &mut input, &mut organizer).unwrap();

    assert_eq!(end, SessionEnd::Completed);
    assert_eq!(input.seen.len(), 6);
    let distinct: HashSet<_> = input.seen.iter().map(unordered).collect();
    assert_eq!(distinct.len(), 6);

    let scores: Vec<u32> = names.iter().map(|n| session.scores().score(&(*n).into())).collect();
    assert_eq!(scores, vec![3, 2, 1, 0]);

    assert_eq!(tier_names(&session, 5), vec!["A.png"]);
    assert_eq!(tier_names(&session, 4), vec!["B.png"]);
    assert_eq!(tier_names(&session, 3), vec!["C.png"]);
    assert!(tier_names(&session, 2).is_empty());
    assert_eq!(tier_names(&session, 1), vec!["D.png"]);

    let report = organizer.organize(session.images(), &session.assign_tiers()).unwrap();
    assert_eq!(report.copied, 4);
    assert!(dir.path().join("rated_5").join("A.png").is_file());
    assert!(dir.path().join("rated_1").join("D.png").is_file());
}

#[test]
fn rejecting_mid_session_moves_file_and_drops_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["A.png", "B.png", "C.png", "D.png", "E.png"];
    write_images(dir.path(), &names);
    let config = Config::default();

    let report = FolderLoader::from_config(&config).load(dir.path()).unwrap();
    let mut session = SessionState::new(report.images);
    let mut organizer = FolderOrganizer::new(dir.path(), &config);

    // Play until B shows up, then reject it
    loop {
        let pair = session.next_pair().unwrap();
        let b = ImageId::new("B.png");
        if pair.contains(&b) {
            let decision = if pair.left == b { Decision::RejectLeft } else { Decision::RejectRight };
            let before = session.progress();
            let transition = session.apply_outcome(&pair, decision).unwrap();
            let image_rater::Transition::Rejected(event) = transition else {
                panic!("expected a rejection");
            };
            organizer.move_rejected(&event).unwrap();

            assert_eq!(session.progress().completed, before.completed);
            assert_eq!(session.progress().total, before.total - event.dropped_pairs);
            break;
        }
        session.apply_outcome(&pair, Decision::LeftBetter).unwrap();
    }

    assert!(dir.path().join("rejected").join("B.png").is_file());
    assert!(!dir.path().join("B.png").exists());

    let mut input = ScriptedInput::new(names.to_vec());
    run_session(&mut session, &mut input, &mut organizer).unwrap();

    assert!(input.seen.iter().all(|pair| !pair.contains(&"B.png".into())));
    let progress = session.progress();
    assert_eq!(progress.completed, progress.total);

    let assignment = session.assign_tiers();
    assert_eq!(assignment.len(), 4);
    assert_eq!(assignment.tier_of(&"B.png".into()), None);
}

#[test]
fn stale_pair_is_refused() {
    let images = ImageSet::with_images("/photos", ["a.jpg", "b.jpg", "c.jpg"]);
    let mut session = SessionState::new(images);

    let first = session.next_pair().unwrap();
    session.apply_outcome(&first, Decision::LeftBetter).unwrap();
    let second = session.next_pair().unwrap();

    let err = session.apply_outcome(&first, Decision::RightBetter).unwrap_err();
    assert!(matches!(err, Error::StalePair { .. }));

    let forged = Pair {
        position: second.position,
        left: second.right.clone(),
        right: second.left.clone(),
    };
    assert!(matches!(
        session.apply_outcome(&forged, Decision::LeftBetter),
        Err(Error::StalePair { .. })
    ));

    // The real pair still goes through
    session.apply_outcome(&second, Decision::LeftBetter).unwrap();
}

#[test]
fn save_and_quit_resumes_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["a.png", "b.png", "c.png", "d.png", "e.png", "f.png"];
    write_images(dir.path(), &names);
    let config = Config::default();
    let store = ProgressStore::new(dir.path(), &config.session.progress_file);
    let mut organizer = FolderOrganizer::new(dir.path(), &config);

    let report = FolderLoader::from_config(&config).load(dir.path()).unwrap();
    let mut session = SessionState::new(report.images);
    let mut input = ScriptedInput::new(names.to_vec()).then([
        Decision::LeftBetter,
        Decision::RejectRight,
        Decision::RightBetter,
        Decision::LeftBetter,
        Decision::SaveAndQuit,
    ]);

    let end = run_session(&mut session, &mut input, &mut organizer).unwrap();
    assert_eq!(end, SessionEnd::Suspended);
    store.save(&session).unwrap();
    assert!(dir.path().join(DEFAULT_PROGRESS_FILE).is_file());

    let outstanding = input.seen.last().cloned().unwrap();
    let mut resumed = store.load().unwrap();

    assert_eq!(resumed.progress(), session.progress());
    assert_eq!(resumed.scores(), session.scores());
    assert_eq!(resumed.next_pair().unwrap(), outstanding);

    // Both copies play out the same remaining sequence
    let mut original_input = ScriptedInput::new(names.to_vec());
    let mut resumed_input = ScriptedInput::new(names.to_vec());
    run_session(&mut session, &mut original_input, &mut organizer).unwrap();
    run_session(&mut resumed, &mut resumed_input, &mut organizer).unwrap();

    assert_eq!(original_input.seen, resumed_input.seen);
    assert_eq!(original_input.progress, resumed_input.progress);
    assert_eq!(session.assign_tiers(), resumed.assign_tiers());
}

#[test]
fn end_now_assigns_tiers_from_partial_scores() {
    let images = ImageSet::with_images("/photos", ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);
    let mut session = SessionState::new(images);
    let mut input = ScriptedInput::new(vec!["e.jpg"]).then([
        Decision::RightBetter,
        Decision::LeftBetter,
        Decision::EndNow,
    ]);

    struct NoMoves;
    impl FileOrganizer for NoMoves {
        fn move_rejected(&mut self, _event: &image_rater::RejectedImage) -> Result<()> {
            Ok(())
        }
        fn organize(
            &mut self,
            _images: &ImageSet,
            _assignment: &image_rater::TierAssignment,
        ) -> Result<image_rater::organize::OrganizeReport> {
            Ok(Default::default())
        }
    }

    let end = run_session(&mut session, &mut input, &mut NoMoves).unwrap();
    assert_eq!(end, SessionEnd::EndedEarly);
    assert!(end.is_final());
    assert!(!session.is_exhausted());
    assert_eq!(session.progress().completed, 2);

    let assignment = session.assign_tiers();
    assert_eq!(assignment.sizes().iter().sum::<usize>(), 5);
    assert_eq!(assignment.sizes()[0], 1);
}

#[test]
fn corrupt_progress_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path(), &["a.png", "b.png"]);
    let store = ProgressStore::new(dir.path(), DEFAULT_PROGRESS_FILE);

    let session = SessionState::new(ImageSet::with_images(dir.path(), ["a.png", "b.png"]));
    store.save(&session).unwrap();
    fs::remove_file(dir.path().join("b.png")).unwrap();

    assert!(matches!(store.load(), Err(Error::CorruptProgress(_))));

    fs::write(store.path(), "{ not json").unwrap();
    assert!(matches!(store.load(), Err(Error::CorruptProgress(_))));
}

#[test]
fn too_few_images_completes_immediately() {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path(), &["only.png"]);
    let config = Config::default();

    let report = FolderLoader::from_config(&config).load(dir.path()).unwrap();
    let mut session = SessionState::new(report.images);
    let mut input = ScriptedInput::new(vec![]);
    let mut organizer = FolderOrganizer::new(dir.path(), &config);

    let end = run_session(&mut session, &mut input, &mut organizer).unwrap();
    assert_eq!(end, SessionEnd::Completed);
    assert!(input.seen.is_empty());
    assert_eq!(session.assign_tiers().tier_of(&"only.png".into()), Tier::new(5));
}
