use crate::domain::breakdown::{total_flagged, total_for_category};
use crate::domain::category::{Classifier, IMMEDIATE, NEGOTIABLE};
use crate::domain::history::History;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Workbook, XlsxError};

const HEADERS: [&str; 9] = [
    "Date",
    "Time",
    "Property",
    "Count",
    "Flagged",
    "Immediate",
    "Negotiable",
    "Success",
    "Error",
];

fn xlsx_err(what: &str) -> impl Fn(XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

/// One row per (entry, property), oldest first.
pub fn history_workbook(history: &History, classifier: &Classifier) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("History")
        .map_err(xlsx_err("sheet name"))?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_err(header))?;
    }

    let mut r: u32 = 1;
    for entry in history.entries() {
        for data in &entry.properties {
            let single = std::slice::from_ref(data);
            let flagged = total_flagged(single, classifier);

            worksheet
                .write_string(r, 0, &entry.date)
                .map_err(xlsx_err("date"))?;
            worksheet
                .write_string(r, 1, &entry.time)
                .map_err(xlsx_err("time"))?;
            worksheet
                .write_string(r, 2, &data.name)
                .map_err(xlsx_err("property"))?;
            worksheet
                .write_number(r, 3, data.count as f64)
                .map_err(xlsx_err("count"))?;
            worksheet
                .write_number(r, 4, flagged as f64)
                .map_err(xlsx_err("flagged"))?;
            worksheet
                .write_number(r, 5, total_for_category(single, IMMEDIATE) as f64)
                .map_err(xlsx_err("immediate"))?;
            worksheet
                .write_number(r, 6, total_for_category(single, NEGOTIABLE) as f64)
                .map_err(xlsx_err("negotiable"))?;
            worksheet
                .write_string(r, 7, if data.success { "Yes" } else { "No" })
                .map_err(xlsx_err("success"))?;
            worksheet
                .write_string(r, 8, data.error.as_deref().unwrap_or(""))
                .map_err(xlsx_err("error"))?;

            r += 1;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_history_xlsx(history: &History, classifier: &Classifier) -> ResultResp {
    let buffer = history_workbook(history, classifier)?;
    xlsx_response(buffer, "property_history.xlsx")
}
