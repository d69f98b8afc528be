//! Column selection for the header-range endpoint.
//!
//! Each column is selected by one character: uppercase for the absolute
//! (cumulative) value, lowercase for the value relative to the previous row.

/// Columns the backend can report for a header range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderColumn {
    HashAbs,
    TimeAbs,
    TimeRel,
    AgeAbs,
    AgeRel,
    DifficultyAbs,
    DifficultyRel,
    FeeAbs,
    FeeRel,
    KernelsAbs,
    KernelsRel,
    MwOutputsAbs,
    MwOutputsRel,
    MwInputsAbs,
    MwInputsRel,
    MwUtxosAbs,
    MwUtxosRel,
    ShieldedOutputsAbs,
    ShieldedOutputsRel,
    ShieldedInputsAbs,
    ShieldedInputsRel,
    ContractsActiveAbs,
    ContractsActiveRel,
    ContractCallsAbs,
    ContractCallsRel,
    SizeCompressedAbs,
    SizeCompressedRel,
    SizeArchiveAbs,
    SizeArchiveRel,
}

impl HeaderColumn {
    /// Number of distinct columns, also the cap on a selection.
    pub const COUNT: usize = 29;

    /// Selection used when the request has no `cols` argument.
    pub const DEFAULTS: [HeaderColumn; 10] = [
        HeaderColumn::HashAbs,
        HeaderColumn::TimeAbs,
        HeaderColumn::DifficultyRel,
        HeaderColumn::FeeRel,
        HeaderColumn::KernelsRel,
        HeaderColumn::MwOutputsRel,
        HeaderColumn::MwInputsRel,
        HeaderColumn::ShieldedOutputsRel,
        HeaderColumn::ShieldedInputsRel,
        HeaderColumn::ContractCallsRel,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        use HeaderColumn::*;

        let column = match code {
            'H' => HashAbs,
            'T' => TimeAbs,
            't' => TimeRel,
            'G' => AgeAbs,
            'g' => AgeRel,
            'D' => DifficultyAbs,
            'd' => DifficultyRel,
            'F' => FeeAbs,
            'f' => FeeRel,
            'K' => KernelsAbs,
            'k' => KernelsRel,
            'O' => MwOutputsAbs,
            'o' => MwOutputsRel,
            'I' => MwInputsAbs,
            'i' => MwInputsRel,
            'U' => MwUtxosAbs,
            'u' => MwUtxosRel,
            'Z' => ShieldedOutputsAbs,
            'z' => ShieldedOutputsRel,
            'Y' => ShieldedInputsAbs,
            'y' => ShieldedInputsRel,
            'B' => ContractsActiveAbs,
            'b' => ContractsActiveRel,
            'P' => ContractCallsAbs,
            'p' => ContractCallsRel,
            'C' => SizeCompressedAbs,
            'c' => SizeCompressedRel,
            'A' => SizeArchiveAbs,
            'a' => SizeArchiveRel,
            _ => return None,
        };
        Some(column)
    }

    pub fn code(self) -> char {
        use HeaderColumn::*;

        match self {
            HashAbs => 'H',
            TimeAbs => 'T',
            TimeRel => 't',
            AgeAbs => 'G',
            AgeRel => 'g',
            DifficultyAbs => 'D',
            DifficultyRel => 'd',
            FeeAbs => 'F',
            FeeRel => 'f',
            KernelsAbs => 'K',
            KernelsRel => 'k',
            MwOutputsAbs => 'O',
            MwOutputsRel => 'o',
            MwInputsAbs => 'I',
            MwInputsRel => 'i',
            MwUtxosAbs => 'U',
            MwUtxosRel => 'u',
            ShieldedOutputsAbs => 'Z',
            ShieldedOutputsRel => 'z',
            ShieldedInputsAbs => 'Y',
            ShieldedInputsRel => 'y',
            ContractsActiveAbs => 'B',
            ContractsActiveRel => 'b',
            ContractCallsAbs => 'P',
            ContractCallsRel => 'p',
            SizeCompressedAbs => 'C',
            SizeCompressedRel => 'c',
            SizeArchiveAbs => 'A',
            SizeArchiveRel => 'a',
        }
    }
}

/// Resolve a `cols` argument. Unknown characters are skipped and the result
/// is truncated at [`HeaderColumn::COUNT`] entries.
pub fn parse_columns(selector: Option<&str>) -> Vec<HeaderColumn> {
    let Some(selector) = selector else {
        return HeaderColumn::DEFAULTS.to_vec();
    };

    selector
        .chars()
        .filter_map(HeaderColumn::from_code)
        .take(HeaderColumn::COUNT)
        .collect()
}

/// Inverse of [`parse_columns`] for an explicit selection.
pub fn columns_to_selector(columns: &[HeaderColumn]) -> String {
    columns.iter().map(|c| c.code()).collect()
}
