//! The "Mini Registration Report": an interactive single-page view and a
//! print view with every page, both cut from the same ordered sequence.

use crate::model::RegistrationRow;
use crate::paginate::{self, Page};

pub const REPORT_PAGE_SIZE: usize = 10;
pub const REPORT_TITLE: &str = "Mini Registration Report";

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Global 1-based position ("Sl").
    pub rank: usize,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD` or "N/A".
    pub date_of_birth: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub number: usize,
    /// Print header, "Mini Registration Report - Page N".
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl From<Page<&RegistrationRow>> for ReportPage {
    fn from(page: Page<&RegistrationRow>) -> Self {
        Self {
            number: page.number,
            title: format!("{REPORT_TITLE} - Page {}", page.number),
            lines: page
                .items
                .into_iter()
                .map(|ranked| ReportLine {
                    rank: ranked.rank,
                    name: ranked.item.full_name(),
                    email: ranked.item.email.clone(),
                    phone: ranked.item.phone.clone(),
                    date_of_birth: ranked.item.date_of_birth_display(),
                })
                .collect(),
        }
    }
}

/// Report over a snapshot of rows. Opens on page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pages: Vec<ReportPage>,
    current: usize,
}

impl Report {
    pub fn open<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a RegistrationRow>,
    {
        let rows: Vec<&RegistrationRow> = rows.into_iter().collect();
        let pages = paginate::paginate(&rows, REPORT_PAGE_SIZE)
            .into_iter()
            .map(ReportPage::from)
            .collect();
        Self { pages, current: 1 }
    }

    pub fn title(&self) -> &'static str {
        REPORT_TITLE
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Navigation controls are only shown for more than one page.
    pub fn has_pagination(&self) -> bool {
        self.page_count() > 1
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// The page shown on screen.
    pub fn current(&self) -> &ReportPage {
        &self.pages[self.current - 1]
    }

    /// Every page, for printing.
    pub fn print_pages(&self) -> &[ReportPage] {
        &self.pages
    }

    pub fn go_to(&mut self, page: usize) {
        self.current = paginate::clamp_page(page, self.page_count());
    }

    pub fn next(&mut self) {
        self.go_to(self.current.saturating_add(1));
    }

    pub fn prev(&mut self) {
        self.go_to(self.current.saturating_sub(1));
    }

    pub fn can_go_next(&self) -> bool {
        self.current < self.page_count()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current > 1
    }
}
