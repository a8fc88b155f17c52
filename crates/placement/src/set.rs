use crate::error::LayoutError;
use crate::layout::{PageLayout, PageLayoutRecord, validate};
use log::debug;

/// The layouts for every page of one template, ordered by page number.
///
/// Construction guarantees the page numbers are exactly `1..=N`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSet {
    layouts: Vec<PageLayout>,
}

impl LayoutSet {
    /// Sorts the layouts by page number and checks for gaps and duplicates.
    pub fn new(mut layouts: Vec<PageLayout>) -> Result<Self, LayoutError> {
        for layout in &layouts {
            layout.validate()?;
        }
        layouts.sort_by_key(|layout| layout.page_number);

        let mut expected = 1u32;
        for layout in &layouts {
            if layout.page_number < expected {
                return Err(LayoutError::DuplicatePage {
                    page: layout.page_number,
                });
            }
            if layout.page_number > expected {
                return Err(LayoutError::MissingPage { page: expected });
            }
            expected += 1;
        }
        Ok(Self { layouts })
    }

    pub(crate) fn from_checked(layouts: Vec<PageLayout>) -> Self {
        Self { layouts }
    }

    pub fn from_records(records: Vec<PageLayoutRecord>) -> Result<Self, LayoutError> {
        let layouts = records
            .into_iter()
            .map(validate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(layouts)
    }

    /// Parses the editor's JSON array of layout records.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let records: Vec<PageLayoutRecord> = serde_json::from_str(json)?;
        debug!("Parsed {} layout records", records.len());
        Self::from_records(records)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(&self.layouts)?)
    }

    /// One default layout for each of `page_count` pages.
    pub fn defaults(page_count: u32) -> Self {
        Self {
            layouts: (1..=page_count).map(PageLayout::default_for_page).collect(),
        }
    }

    pub fn get(&self, page_number: u32) -> Option<&PageLayout> {
        let index = usize::try_from(page_number).ok()?.checked_sub(1)?;
        self.layouts.get(index)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.layouts.iter().filter(|l| l.enabled).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageLayout> {
        self.layouts.iter()
    }

    pub fn as_slice(&self) -> &[PageLayout] {
        &self.layouts
    }

    pub fn into_vec(self) -> Vec<PageLayout> {
        self.layouts
    }
}

impl<'a> IntoIterator for &'a LayoutSet {
    type Item = &'a PageLayout;
    type IntoIter = std::slice::Iter<'a, PageLayout>;

    fn into_iter(self) -> Self::IntoIter {
        self.layouts.iter()
    }
}
