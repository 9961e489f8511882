//! Spreadsheet decoding
//!
//! Decodes the uploaded CSV bytes into rows of strings. The header row must
//! match [`EXPECTED_HEADERS`] exactly (order and spelling); any mismatch
//! aborts the whole import before a single row is processed.

use serde_json::json;
use thiserror::Error;

use crate::utils::AppError;

/// Expected header row, in order
pub const EXPECTED_HEADERS: [&str; 11] = [
    "Nome Completo",
    "CPF",
    "Email",
    "Telefone",
    "Departamento",
    "Cargo",
    "Data Nascimento",
    "Data Admissão",
    "Sexo",
    "Escolaridade",
    "Líder",
];

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Invalid spreadsheet: {0}")]
    Malformed(String),

    #[error("Unexpected header row: expected '{expected}', found '{found}'")]
    HeaderMismatch { expected: String, found: String },
}

impl From<SheetError> for AppError {
    fn from(e: SheetError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// One decoded data row.
///
/// `number` is the 1-based spreadsheet row counting the header, so the first
/// data row is row 2. `email`/`phone` are carried for error echoing only.
#[derive(Debug, Clone)]
pub struct SheetRow {
    pub number: usize,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub birth_date: String,
    pub admission_date: String,
    pub gender: String,
    pub scholarity: String,
    pub leader: String,
}

impl SheetRow {
    /// Original cell values keyed by header, echoed back on row failures
    pub fn echo(&self) -> serde_json::Value {
        json!({
            "Nome Completo": self.name,
            "CPF": self.cpf,
            "Email": self.email,
            "Telefone": self.phone,
            "Departamento": self.department,
            "Cargo": self.position,
            "Data Nascimento": self.birth_date,
            "Data Admissão": self.admission_date,
            "Sexo": self.gender,
            "Escolaridade": self.scholarity,
            "Líder": self.leader,
        })
    }
}

/// Decode CSV bytes into data rows, validating the header first.
pub fn decode(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| SheetError::Malformed(e.to_string()))?;
    let found: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    if found != EXPECTED_HEADERS {
        return Err(SheetError::HeaderMismatch {
            expected: EXPECTED_HEADERS.join(", "),
            found: found.join(", "),
        });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| SheetError::Malformed(e.to_string()))?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        rows.push(SheetRow {
            number: index + 2,
            name: cell(0),
            cpf: cell(1),
            email: cell(2),
            phone: cell(3),
            department: cell(4),
            position: cell(5),
            birth_date: cell(6),
            admission_date: cell(7),
            gender: cell(8),
            scholarity: cell(9),
            leader: cell(10),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Nome Completo,CPF,Email,Telefone,Departamento,Cargo,Data Nascimento,Data Admissão,Sexo,Escolaridade,Líder";

    #[test]
    fn decodes_rows_with_spreadsheet_numbering() {
        let sheet = format!(
            "{HEADER}\n\
             Ana Silva Santos,529.982.247-25,ana@acme.com,(11) 91234-5678,Comercial,Vendedor,1990-05-20,2023-01-02,Feminino,ensino_medio,Não\n\
             Bruno Costa Lima,111.444.777-35,bruno@acme.com,(11) 2345-6789,Comercial,Vendedor,1985-03-11,2022-06-01,Masculino,ensino_superior,Sim\n"
        );
        let rows = decode(sheet.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 2);
        assert_eq!(rows[1].number, 3);
        assert_eq!(rows[0].name, "Ana Silva Santos");
        assert_eq!(rows[1].leader, "Sim");
    }

    #[test]
    fn header_mismatch_aborts() {
        let sheet = "Nome,CPF\nAna Silva,529.982.247-25\n";
        let err = decode(sheet.as_bytes());
        assert!(matches!(err, Err(SheetError::HeaderMismatch { .. })));
    }

    #[test]
    fn reordered_headers_are_rejected() {
        let sheet = "CPF,Nome Completo,Email,Telefone,Departamento,Cargo,Data Nascimento,Data Admissão,Sexo,Escolaridade,Líder\n";
        assert!(decode(sheet.as_bytes()).is_err());
    }

    #[test]
    fn empty_sheet_has_no_rows() {
        let sheet = format!("{HEADER}\n");
        let rows = decode(sheet.as_bytes()).unwrap();
        assert!(rows.is_empty());
    }
}
