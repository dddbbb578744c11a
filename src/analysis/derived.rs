//! Derived statistics computed from a node's raw metric table.
//!
//! Each [`DerivedStat`] maps to one pure formula over a single phase's
//! [`RawTable`]. Ratios are rounded to two decimals and report
//! [`Cell::NaN`] when their denominator accumulated to zero.

use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::metric::Metric;
use super::registry::NodeRegistry;
use super::types::*;

/// Output column of the derived table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum DerivedStat {
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "addr")]
    Addr,
    #[strum(serialize = "tx_up")]
    TxUp,
    #[strum(serialize = "rx_up")]
    RxUp,
    /// Uplink packet delivery ratio
    #[strum(serialize = "uPdr")]
    UplinkPdr,
    #[strum(serialize = "tx_dw")]
    TxDown,
    #[strum(serialize = "rx_dw")]
    RxDown,
    /// Downlink packet delivery ratio
    #[strum(serialize = "dPdr")]
    DownlinkPdr,
    /// Combined packet delivery ratio
    #[strum(serialize = "pdr")]
    Pdr,
    #[strum(serialize = "lastP")]
    LastParent,
    #[strum(serialize = "ps")]
    ParentSwitches,
    #[strum(serialize = "hopD")]
    HopDepth,
    #[strum(serialize = "aHopD")]
    AvgHopDepth,
    #[strum(serialize = "STN")]
    SubtreeSize,
    #[strum(serialize = "aSTN")]
    AvgSubtreeSize,
    /// IP queue losses
    #[strum(serialize = "IPQL")]
    IpQueueLoss,
    #[strum(serialize = "IPQR")]
    IpQueueLossRate,
    /// IP unicast link-layer losses
    #[strum(serialize = "IPLL")]
    IpLinkLoss,
    #[strum(serialize = "IPLR")]
    IpLinkLossRate,
    /// UDP queue losses
    #[strum(serialize = "IUQL")]
    UdpQueueLoss,
    #[strum(serialize = "IUQR")]
    UdpQueueLossRate,
    /// UDP unicast link-layer losses
    #[strum(serialize = "IULL")]
    UdpLinkLoss,
    #[strum(serialize = "IULR")]
    UdpLinkLossRate,
    /// Input buffer overflows
    #[strum(serialize = "InQL")]
    InputQueueLoss,
    /// Transmissions per acknowledged unicast
    #[strum(serialize = "linkE")]
    LinkEfficiency,
    #[strum(serialize = "leave")]
    Leaving,
    /// Radio duty cycle in percent
    #[strum(serialize = "dc")]
    DutyCycle,
    /// Scheduled slots per associated timeslot
    #[strum(serialize = "SCR")]
    ScheduledRatio,
    #[strum(serialize = "OPSR")]
    OrchestraSlotRatio,
    #[strum(serialize = "OOSR")]
    OffloadSlotRatio,
    #[strum(serialize = "UTOR")]
    UnicastTxOccupancy,
    #[strum(serialize = "UROR")]
    UnicastRxOccupancy,
    #[strum(serialize = "PTOR")]
    OrchestraTxOccupancy,
    #[strum(serialize = "PROR")]
    OrchestraRxOccupancy,
    /// Share of offloaded transmissions
    #[strum(serialize = "OPTR")]
    OffloadTxShare,
    #[strum(serialize = "OPRR")]
    OffloadRxShare,
    /// Share of burst transmissions
    #[strum(serialize = "DBTR")]
    BurstTxShare,
    #[strum(serialize = "DBRR")]
    BurstRxShare,
}

/// Columns reported when no selection is configured
pub const DEFAULT_COLUMNS: [DerivedStat; 32] = [
    DerivedStat::Id,
    DerivedStat::Addr,
    DerivedStat::TxUp,
    DerivedStat::UplinkPdr,
    DerivedStat::TxDown,
    DerivedStat::DownlinkPdr,
    DerivedStat::Pdr,
    DerivedStat::LastParent,
    DerivedStat::ParentSwitches,
    DerivedStat::HopDepth,
    DerivedStat::AvgHopDepth,
    DerivedStat::SubtreeSize,
    DerivedStat::AvgSubtreeSize,
    DerivedStat::IpQueueLoss,
    DerivedStat::IpQueueLossRate,
    DerivedStat::IpLinkLoss,
    DerivedStat::IpLinkLossRate,
    DerivedStat::UdpQueueLoss,
    DerivedStat::UdpQueueLossRate,
    DerivedStat::UdpLinkLoss,
    DerivedStat::UdpLinkLossRate,
    DerivedStat::InputQueueLoss,
    DerivedStat::LinkEfficiency,
    DerivedStat::DutyCycle,
    DerivedStat::OrchestraSlotRatio,
    DerivedStat::OffloadSlotRatio,
    DerivedStat::OrchestraTxOccupancy,
    DerivedStat::OrchestraRxOccupancy,
    DerivedStat::OffloadTxShare,
    DerivedStat::OffloadRxShare,
    DerivedStat::BurstTxShare,
    DerivedStat::BurstRxShare,
];

/// Input of a formula: one node's table for one phase
#[derive(Debug, Clone, Copy)]
pub struct RowInput<'a> {
    pub table: &'a RawTable,
    pub is_root: bool,
}

impl RowInput<'_> {
    fn n(&self, metric: Metric) -> f64 {
        self.table.number(metric)
    }

    fn raw(&self, metric: Metric) -> Cell {
        Cell::Text(self.table.text(metric))
    }
}

pub type Formula = fn(&RowInput<'_>) -> Cell;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator * scale`, or NaN for a zero denominator
fn ratio(numerator: f64, denominator: f64, scale: f64) -> Cell {
    if denominator == 0.0 {
        Cell::NaN
    } else {
        Cell::Number(round2(numerator / denominator * scale))
    }
}

fn percent(numerator: f64, denominator: f64) -> Cell {
    ratio(numerator, denominator, 100.0)
}

/// `part / (part + rest) * 100`
fn share(part: f64, rest: f64) -> Cell {
    percent(part, part + rest)
}

/// Delivery ratios are undefined for the root, which only receives
fn delivery(row: &RowInput<'_>, rx: f64, tx: f64) -> Cell {
    if row.is_root {
        Cell::NaN
    } else {
        percent(rx, tx)
    }
}

impl DerivedStat {
    /// Column header
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The formula computing this column
    pub fn formula(self) -> Formula {
        use Metric as M;
        match self {
            DerivedStat::Id => |r| r.raw(M::Id),
            DerivedStat::Addr => |r| r.raw(M::Addr),
            DerivedStat::TxUp => |r| r.raw(M::TxUp),
            DerivedStat::RxUp => |r| r.raw(M::RxUp),
            DerivedStat::UplinkPdr => |r| delivery(r, r.n(M::RxUp), r.n(M::TxUp)),
            DerivedStat::TxDown => |r| r.raw(M::TxDown),
            DerivedStat::RxDown => |r| r.raw(M::RxDown),
            DerivedStat::DownlinkPdr => |r| delivery(r, r.n(M::RxDown), r.n(M::TxDown)),
            DerivedStat::Pdr => |r| {
                delivery(
                    r,
                    r.n(M::RxUp) + r.n(M::RxDown),
                    r.n(M::TxUp) + r.n(M::TxDown),
                )
            },
            DerivedStat::LastParent => |r| r.raw(M::LastParent),
            DerivedStat::ParentSwitches => |r| r.raw(M::ParentSwitches),
            DerivedStat::HopDepth => |r| r.raw(M::HopDNow),
            DerivedStat::AvgHopDepth => |r| ratio(r.n(M::HopDSum), r.n(M::HopDCnt), 1.0),
            DerivedStat::SubtreeSize => |r| r.raw(M::SubtreeNow),
            DerivedStat::AvgSubtreeSize => {
                |r| ratio(r.n(M::SubtreeSum), r.n(M::SubtreeCnt), 1.0)
            }
            DerivedStat::IpQueueLoss => |r| r.raw(M::IpQloss),
            DerivedStat::IpQueueLossRate => |r| share(r.n(M::IpQloss), r.n(M::IpEnq)),
            DerivedStat::IpLinkLoss => |r| r.raw(M::IpUcNoack),
            DerivedStat::IpLinkLossRate => |r| share(r.n(M::IpUcNoack), r.n(M::IpUcOk)),
            DerivedStat::UdpQueueLoss => |r| r.raw(M::IpUdpQloss),
            DerivedStat::UdpQueueLossRate => |r| share(r.n(M::IpUdpQloss), r.n(M::IpUdpEnq)),
            DerivedStat::UdpLinkLoss => |r| r.raw(M::IpUcUdpNoack),
            DerivedStat::UdpLinkLossRate => {
                |r| share(r.n(M::IpUcUdpNoack), r.n(M::IpUcUdpOk))
            }
            DerivedStat::InputQueueLoss => |r| r.raw(M::InputFull),
            DerivedStat::LinkEfficiency => |r| {
                ratio(
                    r.n(M::KaTx) + r.n(M::IpUcTx),
                    r.n(M::KaOk) + r.n(M::IpUcOk),
                    1.0,
                )
            },
            DerivedStat::Leaving => |r| r.raw(M::Leaving),
            // dc_total_sum is reported in hundredths of a percent
            DerivedStat::DutyCycle => |r| ratio(r.n(M::DcTotalSum), r.n(M::DcCount) * 100.0, 1.0),
            DerivedStat::ScheduledRatio => |r| percent(r.n(M::SchAny), r.n(M::AssoTs)),
            DerivedStat::OrchestraSlotRatio => {
                |r| percent(r.n(M::SchOpTx) + r.n(M::SchOpRx), r.n(M::AssoTs))
            }
            DerivedStat::OffloadSlotRatio => {
                |r| percent(r.n(M::SchOoTx) + r.n(M::SchOoRx), r.n(M::AssoTs))
            }
            DerivedStat::UnicastTxOccupancy => |r| percent(r.n(M::UcTxOp), r.n(M::SchUcTx)),
            DerivedStat::UnicastRxOccupancy => |r| percent(r.n(M::UcRxOp), r.n(M::SchUcRx)),
            DerivedStat::OrchestraTxOccupancy => |r| percent(r.n(M::OpTxOp), r.n(M::SchOpTx)),
            DerivedStat::OrchestraRxOccupancy => |r| percent(r.n(M::OpRxOp), r.n(M::SchOpRx)),
            DerivedStat::OffloadTxShare => |r| share(r.n(M::OoTxOp), r.n(M::OpTxOp)),
            DerivedStat::OffloadRxShare => |r| share(r.n(M::OoRxOp), r.n(M::OpRxOp)),
            DerivedStat::BurstTxShare => |r| share(r.n(M::OpBTxOp), r.n(M::OpTxOp)),
            DerivedStat::BurstRxShare => |r| share(r.n(M::OpBRxOp), r.n(M::OpRxOp)),
        }
    }

    pub fn compute(self, row: &RowInput<'_>) -> Cell {
        (self.formula())(row)
    }
}

impl Serialize for DerivedStat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Compute one node's row
pub fn derive_row(row: &RowInput<'_>, columns: &[DerivedStat]) -> Vec<Cell> {
    columns.iter().map(|stat| stat.compute(row)).collect()
}

/// Compute the ordered table of one phase. `tables` is in registry order.
pub fn derive_table(
    phase: Phase,
    registry: &NodeRegistry,
    tables: &[RawTable],
    columns: &[DerivedStat],
) -> PhaseTable {
    let rows = registry
        .nodes()
        .iter()
        .zip(tables)
        .enumerate()
        .map(|(index, (node, table))| DerivedRow {
            node_id: node.id,
            cells: derive_row(
                &RowInput {
                    table,
                    is_root: index == ROOT_INDEX,
                },
                columns,
            ),
        })
        .collect();

    PhaseTable {
        phase,
        columns: columns.to_vec(),
        rows,
    }
}
