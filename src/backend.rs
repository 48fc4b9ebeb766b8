use std::time::Duration;

use chrono::NaiveDate;

use crate::background::BackgroundStore;
use crate::categories::{CategoryError, CategoryStore};
use crate::config::BoardConfig;
use crate::db::{LoadedState, Persistence};
use crate::filter::{self, ViewMode};
use crate::memos::MemoStore;
use crate::models::{
    CategoryFilter, ImagePlaceholder, Language, MAX_TITLE_CHARS, Memo, MemoDraft, MemoIcon,
};
use crate::upload::{UploadError, UploadOutcome, UploadTarget, UploadWorker, process_upload};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CategoryError> for BackendError {
    fn from(err: CategoryError) -> Self {
        BackendError::Validation(err.to_string())
    }
}

impl From<UploadError> for BackendError {
    fn from(err: UploadError) -> Self {
        BackendError::UnsupportedInput(err.to_string())
    }
}

/// Result of applying one finished upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub seq: u64,
    pub target: UploadTarget,
    pub result: Result<ImagePlaceholder, BackendError>,
}

/// The memo, category and background stores plus their write-through
/// persistence and the current view state.
///
/// Every mutating method updates memory first and then rewrites each slot it
/// touched. A failed write is reported as `BackendError::Storage` but the
/// in-memory change is kept; slots are never rolled back together.
pub struct MemoBoard {
    config: BoardConfig,
    persistence: Persistence,
    memos: MemoStore,
    categories: CategoryStore,
    background: BackgroundStore,
    active_category: CategoryFilter,
    search_text: String,
    uploads: Option<UploadWorker>,
}

impl MemoBoard {
    pub fn open(config: BoardConfig) -> Self {
        let persistence = Persistence::open(&config);
        Self::with_persistence(config, persistence)
    }

    pub fn with_persistence(config: BoardConfig, mut persistence: Persistence) -> Self {
        let LoadedState {
            memos,
            categories,
            background,
        } = persistence.load();
        Self {
            config,
            persistence,
            memos,
            categories,
            background,
            active_category: CategoryFilter::All,
            search_text: String::new(),
            uploads: None,
        }
    }

    pub fn memos(&self) -> &[Memo] {
        self.memos.as_slice()
    }

    pub fn memo(&self, id: &str) -> Option<&Memo> {
        self.memos.get(id)
    }

    pub fn categories(&self) -> &[String] {
        self.categories.as_slice()
    }

    pub fn background(&self) -> &BackgroundStore {
        &self.background
    }

    pub fn active_category(&self) -> &CategoryFilter {
        &self.active_category
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_active_category(&mut self, filter: CategoryFilter) {
        self.active_category = filter;
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn search_by_date(&mut self, date: NaiveDate) {
        self.search_text = filter::date_search_text(date);
    }

    pub fn view_mode(&self) -> ViewMode {
        filter::view_mode(&self.active_category, &self.search_text)
    }

    pub fn visible_memos(&self) -> Vec<&Memo> {
        filter::visible_memos(self.memos.as_slice(), &self.active_category, &self.search_text)
    }

    pub fn add_memo(&mut self, draft: MemoDraft) -> Result<Memo, BackendError> {
        let title = validate_title(&draft.title)?;
        let content = validate_content(&draft.content)?;
        let memo = self
            .memos
            .add(MemoDraft {
                title,
                content,
                ..draft
            })
            .clone();
        self.save_memos()?;
        Ok(memo)
    }

    /// Unknown ids are ignored and reported as `Ok(false)`.
    pub fn update_memo(&mut self, mut memo: Memo) -> Result<bool, BackendError> {
        memo.title = validate_title(&memo.title)?;
        memo.content = validate_content(&memo.content)?;
        if !self.memos.update(memo) {
            log::debug!("update for unknown memo ignored");
            return Ok(false);
        }
        self.save_memos()?;
        Ok(true)
    }

    pub fn delete_memo(&mut self, id: &str) -> Result<bool, BackendError> {
        if !self.memos.delete(id) {
            return Ok(false);
        }
        self.save_memos()?;
        Ok(true)
    }

    /// Only applies in `ViewMode::Manual`; any other mode leaves the order alone.
    pub fn reorder_memos(&mut self, source_id: &str, target_id: &str) -> Result<bool, BackendError> {
        if self.view_mode() != ViewMode::Manual {
            log::debug!("reorder ignored while a filter or search is active");
            return Ok(false);
        }
        if !self.memos.reorder(source_id, target_id) {
            return Ok(false);
        }
        self.save_memos()?;
        Ok(true)
    }

    pub fn set_memo_icon(&mut self, id: &str, icon: Option<MemoIcon>) -> Result<(), BackendError> {
        let mut memo = self
            .memos
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("memo {id}")))?;
        memo.icon = icon;
        self.memos.update(memo);
        self.save_memos()
    }

    pub fn set_memo_cover(&mut self, id: &str, url: Option<String>) -> Result<(), BackendError> {
        if !self.memos.set_cover_image(id, url) {
            return Err(BackendError::NotFound(format!("memo {id}")));
        }
        self.save_memos()
    }

    pub fn add_category(&mut self, label: &str) -> Result<String, BackendError> {
        let label = self.categories.add(label)?.to_string();
        self.save(|p, board| p.save_categories(board.categories.as_slice()))?;
        Ok(label)
    }

    /// Removes the label, uncategorizes its memos and resets a filter that
    /// pointed at it. Returns how many memos were uncategorized.
    pub fn delete_category(&mut self, label: &str) -> Result<usize, BackendError> {
        let removed = self.categories.delete(label);
        let cleared = self.memos.clear_category(label);
        if self.active_category == CategoryFilter::label(label) {
            self.active_category = CategoryFilter::All;
        }

        let categories_saved = if removed {
            self.save(|p, board| p.save_categories(board.categories.as_slice()))
        } else {
            Ok(())
        };
        let memos_saved = if cleared > 0 { self.save_memos() } else { Ok(()) };
        categories_saved.and(memos_saved)?;
        Ok(cleared)
    }

    pub fn set_background_image(&mut self, image_ref: &str) -> Result<(), BackendError> {
        self.background.set_background_image(image_ref);
        self.save_background_scalars()
    }

    pub fn set_background_color(&mut self, color: &str) -> Result<(), BackendError> {
        self.background.set_background_color(color);
        self.save_background_scalars()
    }

    pub fn set_background_opacity(&mut self, opacity: f32) -> Result<(), BackendError> {
        self.background.set_background_opacity(opacity);
        self.save(|p, board| p.save_background_opacity(board.background.opacity()))
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), BackendError> {
        self.background.set_language(language);
        self.save(|p, _| p.save_language(language))
    }

    pub fn delete_image(&mut self, id: &str) -> Result<bool, BackendError> {
        let Some(cleared_background) = self.background.delete_image(id) else {
            return Ok(false);
        };
        let images_saved = self.save(|p, board| p.save_images(board.background.images()));
        let url_saved = if cleared_background {
            self.save(|p, board| p.save_background_url(board.background.image_ref()))
        } else {
            Ok(())
        };
        images_saved.and(url_saved)?;
        Ok(true)
    }

    /// Validates an icon name picked by the user.
    pub fn parse_icon(name: &str) -> Result<MemoIcon, BackendError> {
        name.parse::<MemoIcon>()
            .map_err(|err| BackendError::Validation(err.to_string()))
    }

    /// Queues an upload on the worker thread. The result is applied by
    /// `poll_uploads` or `wait_for_upload`.
    pub fn upload_image(&mut self, target: UploadTarget, bytes: Vec<u8>) -> Result<u64, BackendError> {
        self.ensure_target_exists(&target)?;
        let limits = self.config.upload;
        let worker = self.uploads.get_or_insert_with(|| UploadWorker::spawn(limits));
        Ok(worker.submit(target, bytes))
    }

    /// Applies every upload that has finished, in completion order.
    pub fn poll_uploads(&mut self) -> Vec<UploadReport> {
        let mut reports = Vec::new();
        while let Some(outcome) = self.uploads.as_ref().and_then(UploadWorker::try_recv) {
            reports.push(self.apply_upload(outcome));
        }
        reports
    }

    pub fn wait_for_upload(&mut self, timeout: Duration) -> Option<UploadReport> {
        let outcome = self.uploads.as_ref()?.recv_timeout(timeout)?;
        Some(self.apply_upload(outcome))
    }

    /// Processes and applies an upload on the calling thread.
    pub fn upload_image_now(
        &mut self,
        target: UploadTarget,
        bytes: &[u8],
    ) -> Result<ImagePlaceholder, BackendError> {
        self.ensure_target_exists(&target)?;
        let limits = self.config.upload;
        let result = process_upload(bytes, target.max_dimension(&limits), &limits);
        self.apply_upload(UploadOutcome {
            seq: 0,
            target,
            result,
        })
        .result
    }

    fn apply_upload(&mut self, outcome: UploadOutcome) -> UploadReport {
        let UploadOutcome {
            seq,
            target,
            result,
        } = outcome;
        let result = match result {
            Ok(processed) => self.store_uploaded_image(&target, processed.data_url),
            Err(err) => Err(err.into()),
        };
        UploadReport {
            seq,
            target,
            result,
        }
    }

    fn store_uploaded_image(
        &mut self,
        target: &UploadTarget,
        data_url: String,
    ) -> Result<ImagePlaceholder, BackendError> {
        // The memo may have been deleted while the upload was in flight.
        self.ensure_target_exists(target)?;
        let description = match target {
            UploadTarget::Background => "Uploaded background",
            UploadTarget::MemoCover(_) => "Uploaded cover",
        };
        let image = self
            .background
            .add_uploaded_image(data_url, description)
            .clone();
        let images_saved = self.save(|p, board| p.save_images(board.background.images()));

        let target_saved = match target {
            UploadTarget::Background => {
                self.background.set_background_image(&image.image_url);
                self.save_background_scalars()
            }
            UploadTarget::MemoCover(id) => {
                self.memos.set_cover_image(id, Some(image.image_url.clone()));
                self.save_memos()
            }
        };
        images_saved.and(target_saved)?;
        Ok(image)
    }

    fn ensure_target_exists(&self, target: &UploadTarget) -> Result<(), BackendError> {
        match target {
            UploadTarget::MemoCover(id) if self.memos.get(id).is_none() => {
                Err(BackendError::NotFound(format!("memo {id}")))
            }
            _ => Ok(()),
        }
    }

    fn save_memos(&mut self) -> Result<(), BackendError> {
        self.save(|p, board| p.save_memos(board.memos.as_slice()))
    }

    fn save_background_scalars(&mut self) -> Result<(), BackendError> {
        let url_saved = self.save(|p, board| p.save_background_url(board.background.image_ref()));
        let color_saved = self.save(|p, board| p.save_background_color(board.background.color()));
        url_saved.and(color_saved)
    }

    fn save<F>(&mut self, write: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut Persistence, &BoardView<'_>) -> anyhow::Result<()>,
    {
        let view = BoardView {
            memos: &self.memos,
            categories: &self.categories,
            background: &self.background,
        };
        write(&mut self.persistence, &view).map_err(map_anyhow)
    }
}

/// Read-only borrow of the stores handed to slot writers.
struct BoardView<'a> {
    memos: &'a MemoStore,
    categories: &'a CategoryStore,
    background: &'a BackgroundStore,
}

fn validate_title(title: &str) -> Result<String, BackendError> {
    let title = sanitize_text(title);
    let title = title.trim();
    if title.is_empty() {
        return Err(BackendError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(BackendError::Validation(format!(
            "title exceeds {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<String, BackendError> {
    let content = sanitize_text(content);
    if content.trim().is_empty() {
        return Err(BackendError::Validation(
            "content must not be empty".to_string(),
        ));
    }
    Ok(content)
}

/// Drops control characters other than common whitespace.
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            if c == '\n' || c == '\t' || c == '\r' {
                return true;
            }
            if c < ' ' {
                return false;
            }
            // Replacement character and byte order mark
            c != '\u{FFFD}' && c != '\u{FEFF}'
        })
        .collect()
}

fn map_anyhow(err: anyhow::Error) -> BackendError {
    BackendError::Storage(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::bail;
    use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::*;
    use crate::db::{KeyValueStore, MemoryStore};

    fn empty_board() -> MemoBoard {
        let mut persistence = Persistence::in_memory();
        persistence.save_memos(&[]).unwrap();
        persistence.save_categories(&[]).unwrap();
        MemoBoard::with_persistence(BoardConfig::default(), persistence)
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Accepts reads, refuses writes to one slot.
    struct FailingSlot {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl KeyValueStore for FailingSlot {
        fn get(&mut self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            if key == self.failing_key {
                bail!("quota exceeded");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn add_then_delete_leaves_others_untouched() {
        let mut board = empty_board();
        let keep = board.add_memo(MemoDraft::new("Keep", "stay")).unwrap();
        let gone = board.add_memo(MemoDraft::new("Gone", "bye")).unwrap();
        assert!(board.delete_memo(&gone.id).unwrap());
        assert!(board.memo(&gone.id).is_none());
        assert_eq!(board.memos(), [keep]);
        assert!(!board.delete_memo(&gone.id).unwrap());
    }

    #[test]
    fn add_rejects_invalid_drafts() {
        let mut board = empty_board();
        assert!(matches!(
            board.add_memo(MemoDraft::new("  ", "body")),
            Err(BackendError::Validation(_))
        ));
        assert!(matches!(
            board.add_memo(MemoDraft::new("title", "\u{0}")),
            Err(BackendError::Validation(_))
        ));
        assert!(matches!(
            board.add_memo(MemoDraft::new("x".repeat(51), "body")),
            Err(BackendError::Validation(_))
        ));
        assert!(board.memos().is_empty());
        assert!(board.add_memo(MemoDraft::new("가".repeat(50), "body")).is_ok());
    }

    #[test]
    fn update_of_unknown_memo_changes_nothing() {
        let mut board = empty_board();
        let memo = board.add_memo(MemoDraft::new("One", "1")).unwrap();
        let mut ghost = memo.clone();
        ghost.id = "ghost".to_string();
        assert!(!board.update_memo(ghost).unwrap());
        assert_eq!(board.memos(), [memo]);
    }

    #[test]
    fn deleting_category_uncategorizes_and_resets_filter() {
        let mut board = empty_board();
        board.add_category("Work").unwrap();
        board.add_category("Home").unwrap();
        let work = board
            .add_memo(MemoDraft::new("Report", "q1").with_category("Work"))
            .unwrap();
        let home = board
            .add_memo(MemoDraft::new("Dishes", "tonight").with_category("Home"))
            .unwrap();
        board.set_active_category(CategoryFilter::label("Work"));

        assert_eq!(board.delete_category("Work").unwrap(), 1);
        assert_eq!(board.categories(), ["Home"]);
        assert_eq!(board.memo(&work.id).unwrap().category, None);
        assert_eq!(board.memo(&home.id).unwrap().category.as_deref(), Some("Home"));
        assert_eq!(board.active_category(), &CategoryFilter::All);
    }

    #[test]
    fn deleting_other_category_keeps_filter() {
        let mut board = empty_board();
        board.add_category("Work").unwrap();
        board.add_category("Home").unwrap();
        board.set_active_category(CategoryFilter::label("Home"));
        board.delete_category("Work").unwrap();
        assert_eq!(board.active_category(), &CategoryFilter::label("Home"));
    }

    #[test]
    fn category_validation_errors_leave_store_unchanged() {
        let mut board = empty_board();
        board.add_category("Work").unwrap();
        assert!(matches!(board.add_category(" "), Err(BackendError::Validation(_))));
        assert!(matches!(board.add_category("Work"), Err(BackendError::Validation(_))));
        assert_eq!(board.categories(), ["Work"]);
    }

    #[test]
    fn filter_and_search_examples() {
        let mut board = empty_board();
        let shop = board.add_memo(MemoDraft::new("Shop", "y")).unwrap();
        let meeting = board
            .add_memo(MemoDraft::new("Meeting", "x").with_category("Work"))
            .unwrap();
        let ids = |board: &MemoBoard| {
            board
                .visible_memos()
                .into_iter()
                .map(|memo| memo.id.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(&board).len(), 2);
        board.set_active_category(CategoryFilter::label("Work"));
        assert_eq!(ids(&board), [meeting.id.clone()]);
        board.set_active_category(CategoryFilter::Uncategorized);
        assert_eq!(ids(&board), [shop.id.clone()]);
        board.set_active_category(CategoryFilter::All);
        board.set_search_text("meet");
        assert_eq!(ids(&board), [meeting.id.clone()]);
    }

    #[test]
    fn reorder_only_in_manual_mode() {
        let mut board = empty_board();
        let c = board.add_memo(MemoDraft::new("C", "c")).unwrap();
        board.add_memo(MemoDraft::new("B", "b")).unwrap();
        let a = board.add_memo(MemoDraft::new("A", "a")).unwrap();

        board.set_search_text("a");
        assert!(!board.reorder_memos(&c.id, &a.id).unwrap());

        board.set_search_text("");
        assert!(board.reorder_memos(&c.id, &a.id).unwrap());
        let titles: Vec<_> = board.memos().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["C", "A", "B"]);
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempdir().unwrap();
        let config = BoardConfig::with_db_path(dir.path().join("board.db"));
        let id = {
            let mut board = MemoBoard::open(config.clone());
            let memo = board
                .add_memo(MemoDraft::new("Persist me", "body").with_icon(MemoIcon::Coffee))
                .unwrap();
            board.add_category("Travel").unwrap();
            board.set_background_color("#fef08a").unwrap();
            board.set_background_opacity(0.6).unwrap();
            board.set_language(Language::En).unwrap();
            memo.id
        };

        let board = MemoBoard::open(config);
        let memo = board.memo(&id).unwrap();
        assert_eq!(memo.icon, Some(MemoIcon::Coffee));
        assert!(board.categories().iter().any(|c| c == "Travel"));
        assert_eq!(board.background().color(), "#fef08a");
        assert_eq!(board.background().opacity(), 0.6);
        assert_eq!(board.background().language(), Language::En);
    }

    #[test]
    fn failed_slot_write_keeps_memory_and_other_slots() {
        let store = FailingSlot {
            inner: MemoryStore::new(),
            failing_key: crate::db::MEMOS_SLOT,
        };
        let mut board =
            MemoBoard::with_persistence(BoardConfig::default(), Persistence::new(Box::new(store)));
        let before = board.memos().len();
        let result = board.add_memo(MemoDraft::new("Unsaved", "body"));
        assert!(matches!(result, Err(BackendError::Storage(_))));
        assert_eq!(board.memos().len(), before + 1);
        assert!(board.add_category("Still saved").is_ok());
    }

    #[test]
    fn background_upload_becomes_active_background() {
        let mut board = empty_board();
        board.set_background_color("#bfdbfe").unwrap();
        let image = board
            .upload_image_now(UploadTarget::Background, &png_bytes(3000, 1500))
            .unwrap();
        assert!(image.is_user_uploaded());
        assert_eq!(board.background().images()[0], image);
        assert_eq!(board.background().image_ref(), Some(image.image_url.as_str()));
        assert_eq!(board.background().color(), "");

        assert!(board.delete_image(&image.id).unwrap());
        assert_eq!(board.background().image_ref(), None);
    }

    #[test]
    fn cover_upload_targets_memo() {
        let mut board = empty_board();
        let memo = board.add_memo(MemoDraft::new("Trip", "pack")).unwrap();
        let image = board
            .upload_image_now(UploadTarget::MemoCover(memo.id.clone()), &png_bytes(40, 20))
            .unwrap();
        assert_eq!(
            board.memo(&memo.id).unwrap().cover_image_url.as_deref(),
            Some(image.image_url.as_str())
        );
        assert_eq!(board.background().image_ref(), None);

        let missing = board.upload_image_now(UploadTarget::MemoCover("nope".into()), &png_bytes(4, 4));
        assert!(matches!(missing, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn unsupported_upload_does_not_mutate() {
        let mut board = empty_board();
        let images_before = board.background().images().len();
        let result = board.upload_image_now(UploadTarget::Background, b"%PDF-1.4");
        assert!(matches!(result, Err(BackendError::UnsupportedInput(_))));
        assert_eq!(board.background().images().len(), images_before);
    }

    #[test]
    fn async_uploads_apply_in_completion_order() {
        let mut board = empty_board();
        let first = board
            .upload_image(UploadTarget::Background, png_bytes(10, 10))
            .unwrap();
        let second = board
            .upload_image(UploadTarget::Background, png_bytes(12, 12))
            .unwrap();

        let a = board.wait_for_upload(Duration::from_secs(10)).unwrap();
        let b = board.wait_for_upload(Duration::from_secs(10)).unwrap();
        assert_eq!((a.seq, b.seq), (first, second));
        let last = b.result.unwrap();
        assert_eq!(board.background().image_ref(), Some(last.image_url.as_str()));
        assert!(board.poll_uploads().is_empty());
    }

    #[test]
    fn clearing_category_on_update_moves_memo_to_uncategorized() {
        let mut board = empty_board();
        let mut memo = board
            .add_memo(MemoDraft::new("Plan", "agenda").with_category("Work"))
            .unwrap();
        memo.category = Some(String::new());
        memo.cover_image_url = Some(String::new());
        assert_eq!(board.update_memo(memo.clone()), Ok(true));

        let stored = board.memo(&memo.id).unwrap();
        assert_eq!(stored.category, None);
        assert_eq!(stored.cover_image_url, None);
        board.set_active_category(CategoryFilter::Uncategorized);
        assert_eq!(board.visible_memos().len(), 1);
    }

    #[test]
    fn cover_upload_for_memo_deleted_in_flight_is_not_found() {
        let mut board = empty_board();
        let memo = board.add_memo(MemoDraft::new("Trip", "pack")).unwrap();
        let images_before = board.background().images().len();

        board
            .upload_image(UploadTarget::MemoCover(memo.id.clone()), png_bytes(40, 20))
            .unwrap();
        assert!(board.delete_memo(&memo.id).unwrap());

        let report = board.wait_for_upload(Duration::from_secs(10)).unwrap();
        assert!(matches!(report.result, Err(BackendError::NotFound(_))));
        assert_eq!(board.background().images().len(), images_before);
    }

    #[test]
    fn icon_and_cover_edits_require_existing_memo() {
        let mut board = empty_board();
        let memo = board.add_memo(MemoDraft::new("Song", "la la")).unwrap();
        board.set_memo_icon(&memo.id, Some(MemoIcon::Music)).unwrap();
        board
            .set_memo_cover(&memo.id, Some("/images/bg-4.jpg".to_string()))
            .unwrap();
        let stored = board.memo(&memo.id).unwrap();
        assert_eq!(stored.icon, Some(MemoIcon::Music));
        assert_eq!(stored.cover_image_url.as_deref(), Some("/images/bg-4.jpg"));

        board.set_memo_cover(&memo.id, None).unwrap();
        assert_eq!(board.memo(&memo.id).unwrap().cover_image_url, None);
        assert!(matches!(
            board.set_memo_icon("missing", None),
            Err(BackendError::NotFound(_))
        ));
    }

    #[test]
    fn icon_names_are_validated_at_the_boundary() {
        assert_eq!(MemoBoard::parse_icon("music"), Ok(MemoIcon::Music));
        assert!(matches!(
            MemoBoard::parse_icon("unicorn"),
            Err(BackendError::Validation(_))
        ));
    }

    #[test]
    fn date_search_uses_iso_day() {
        let mut board = empty_board();
        board.search_by_date(NaiveDate::from_ymd_opt(2023, 10, 26).unwrap());
        assert_eq!(board.search_text(), "2023-10-26");
        assert_eq!(board.view_mode(), ViewMode::Sorted);
    }
}
