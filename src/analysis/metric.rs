//! Metric vocabulary reported by the node firmware.
//!
//! Every `HCK` record names one or more metrics from this fixed set. Names
//! outside the set are ignored by the parser rather than treated as errors.

use std::str::FromStr;

use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, IntoStaticStr};

/// A named metric as it appears in `HCK <name> <value>` pairs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr,
    strum::EnumString,
)]
pub enum Metric {
    // Identity
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "addr")]
    Addr,

    // End-to-end traffic
    #[strum(serialize = "tx_up")]
    TxUp,
    #[strum(serialize = "rx_up")]
    RxUp,
    #[strum(serialize = "tx_down")]
    TxDown,
    #[strum(serialize = "rx_down")]
    RxDown,

    // IP forwarding
    #[strum(serialize = "fwd_ok")]
    FwdOk,
    #[strum(serialize = "fwd_no_nexthop")]
    FwdNoNexthop,
    #[strum(serialize = "fwd_err")]
    FwdErr,

    // Link-layer unicast outcomes
    #[strum(serialize = "ip_uc_tx")]
    IpUcTx,
    #[strum(serialize = "ip_uc_ok")]
    IpUcOk,
    #[strum(serialize = "ip_uc_noack")]
    IpUcNoack,
    #[strum(serialize = "ip_uc_err")]
    IpUcErr,
    #[strum(serialize = "ip_uc_icmp6_tx")]
    IpUcIcmp6Tx,
    #[strum(serialize = "ip_uc_icmp6_ok")]
    IpUcIcmp6Ok,
    #[strum(serialize = "ip_uc_icmp6_noack")]
    IpUcIcmp6Noack,
    #[strum(serialize = "ip_uc_icmp6_err")]
    IpUcIcmp6Err,
    #[strum(serialize = "ip_uc_udp_tx")]
    IpUcUdpTx,
    #[strum(serialize = "ip_uc_udp_ok")]
    IpUcUdpOk,
    #[strum(serialize = "ip_uc_udp_noack")]
    IpUcUdpNoack,
    #[strum(serialize = "ip_uc_udp_err")]
    IpUcUdpErr,

    // Association
    #[strum(serialize = "asso")]
    Asso,
    #[strum(serialize = "asso_ts")]
    AssoTs,
    #[strum(serialize = "leaving")]
    Leaving,
    #[strum(serialize = "leave_time")]
    LeaveTime,

    // Enhanced beacons
    #[strum(serialize = "eb_qloss")]
    EbQloss,
    #[strum(serialize = "eb_enq")]
    EbEnq,
    #[strum(serialize = "eb_ok")]
    EbOk,
    #[strum(serialize = "eb_noack")]
    EbNoack,
    #[strum(serialize = "eb_err")]
    EbErr,

    // Keepalives
    #[strum(serialize = "ka_send")]
    KaSend,
    #[strum(serialize = "ka_qloss")]
    KaQloss,
    #[strum(serialize = "ka_enq")]
    KaEnq,
    #[strum(serialize = "ka_tx")]
    KaTx,
    #[strum(serialize = "ka_ok")]
    KaOk,
    #[strum(serialize = "ka_noack")]
    KaNoack,
    #[strum(serialize = "ka_err")]
    KaErr,

    // IP queue
    #[strum(serialize = "ip_qloss")]
    IpQloss,
    #[strum(serialize = "ip_enq")]
    IpEnq,
    #[strum(serialize = "ip_ok")]
    IpOk,
    #[strum(serialize = "ip_noack")]
    IpNoack,
    #[strum(serialize = "ip_err")]
    IpErr,
    #[strum(serialize = "ip_icmp6_qloss")]
    IpIcmp6Qloss,
    #[strum(serialize = "ip_icmp6_enq")]
    IpIcmp6Enq,
    #[strum(serialize = "ip_icmp6_ok")]
    IpIcmp6Ok,
    #[strum(serialize = "ip_icmp6_noack")]
    IpIcmp6Noack,
    #[strum(serialize = "ip_icmp6_err")]
    IpIcmp6Err,
    #[strum(serialize = "ip_udp_qloss")]
    IpUdpQloss,
    #[strum(serialize = "ip_udp_enq")]
    IpUdpEnq,
    #[strum(serialize = "ip_udp_ok")]
    IpUdpOk,
    #[strum(serialize = "ip_udp_noack")]
    IpUdpNoack,
    #[strum(serialize = "ip_udp_err")]
    IpUdpErr,

    // Input and dequeue buffers
    #[strum(serialize = "input_full")]
    InputFull,
    #[strum(serialize = "input_avail")]
    InputAvail,
    #[strum(serialize = "dequeued_full")]
    DequeuedFull,
    #[strum(serialize = "dequeued_avail")]
    DequeuedAvail,

    // Schedule
    #[strum(serialize = "sch_any")]
    SchAny,
    #[strum(serialize = "sch_eb_tx")]
    SchEbTx,
    #[strum(serialize = "sch_eb_rx")]
    SchEbRx,
    #[strum(serialize = "sch_bc")]
    SchBc,
    #[strum(serialize = "sch_uc_tx")]
    SchUcTx,
    #[strum(serialize = "sch_uc_rx")]
    SchUcRx,
    #[strum(serialize = "sch_op_tx")]
    SchOpTx,
    #[strum(serialize = "sch_op_rx")]
    SchOpRx,
    #[strum(serialize = "sch_oo_tx")]
    SchOoTx,
    #[strum(serialize = "sch_oo_rx")]
    SchOoRx,
    #[strum(serialize = "any_tx_op")]
    AnyTxOp,
    #[strum(serialize = "any_rx_op")]
    AnyRxOp,
    #[strum(serialize = "eb_tx_op")]
    EbTxOp,
    #[strum(serialize = "eb_rx_op")]
    EbRxOp,
    #[strum(serialize = "bc_tx_op")]
    BcTxOp,
    #[strum(serialize = "bc_rx_op")]
    BcRxOp,
    #[strum(serialize = "uc_tx_op")]
    UcTxOp,
    #[strum(serialize = "uc_rx_op")]
    UcRxOp,
    #[strum(serialize = "op_tx_op")]
    OpTxOp,
    #[strum(serialize = "op_rx_op")]
    OpRxOp,
    #[strum(serialize = "oo_tx_op")]
    OoTxOp,
    #[strum(serialize = "oo_rx_op")]
    OoRxOp,
    #[strum(serialize = "bst_bc")]
    BstBc,
    #[strum(serialize = "bst_uc_tx")]
    BstUcTx,
    #[strum(serialize = "bst_uc_rx")]
    BstUcRx,
    #[strum(serialize = "bst_op_tx")]
    BstOpTx,
    #[strum(serialize = "bst_op_rx")]
    BstOpRx,
    #[strum(serialize = "bc_b_tx_op")]
    BcBTxOp,
    #[strum(serialize = "bc_b_rx_op")]
    BcBRxOp,
    #[strum(serialize = "uc_b_tx_op")]
    UcBTxOp,
    #[strum(serialize = "uc_b_rx_op")]
    UcBRxOp,
    #[strum(serialize = "op_b_tx_op")]
    OpBTxOp,
    #[strum(serialize = "op_b_rx_op")]
    OpBRxOp,

    // RPL routing
    #[strum(serialize = "ps")]
    ParentSwitches,
    #[strum(serialize = "lastP")]
    LastParent,
    #[strum(serialize = "local_repair")]
    LocalRepair,
    #[strum(serialize = "dis_send")]
    DisSend,
    #[strum(serialize = "dioU_send")]
    DioUSend,
    #[strum(serialize = "dioM_send")]
    DioMSend,
    #[strum(serialize = "daoP_send")]
    DaoPSend,
    #[strum(serialize = "daoN_send")]
    DaoNSend,
    #[strum(serialize = "daoP_fwd")]
    DaoPFwd,
    #[strum(serialize = "daoN_fwd")]
    DaoNFwd,
    #[strum(serialize = "daoA_send")]
    DaoASend,

    // Hop depth and subtree size
    #[strum(serialize = "hopD_now")]
    HopDNow,
    #[strum(serialize = "hopD_sum")]
    HopDSum,
    #[strum(serialize = "hopD_cnt")]
    HopDCnt,
    #[strum(serialize = "rdt")]
    Rdt,
    #[strum(serialize = "subtree_now")]
    SubtreeNow,
    #[strum(serialize = "subtree_sum")]
    SubtreeSum,
    #[strum(serialize = "subtree_cnt")]
    SubtreeCnt,

    // Duty cycle
    #[strum(serialize = "dc_count")]
    DcCount,
    #[strum(serialize = "dc_tx_sum")]
    DcTxSum,
    #[strum(serialize = "dc_rx_sum")]
    DcRxSum,
    #[strum(serialize = "dc_total_sum")]
    DcTotalSum,
}

/// Metrics whose bootstrap value seeds the data period instead of resetting.
pub const CARRY_OVER: [Metric; 7] = [
    Metric::Id,
    Metric::Addr,
    Metric::TxUp,
    Metric::RxUp,
    Metric::TxDown,
    Metric::RxDown,
    Metric::LastParent,
];

impl Metric {
    /// Look up a metric by its log name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Metric::from_str(name).ok()
    }

    /// The name used in log records and table headers
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn is_carried_over(self) -> bool {
        CARRY_OVER.contains(&self)
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
