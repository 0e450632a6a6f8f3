use crate::flow::graph::Graph;
use crate::flow::node::{Choice, Node, NodeKind};
use crate::flow::store::InMemoryGraphStore;
use crate::session::CallerType;

// ---------------------------------------------------------------------------
// Built-in demo flows
// ---------------------------------------------------------------------------

/// Store holding the demo flows for every caller type that may run them.
pub fn demo_store() -> InMemoryGraphStore {
    let mut store = InMemoryGraphStore::new();
    for caller in [CallerType::AccountHolder, CallerType::AuthorizedUser] {
        store.insert(caller, "sim", "sim_swap", sim_swap_flow());
        store.insert(caller, "plans", "plan_change", plan_change_flow());
    }
    store.insert(CallerType::OtherUser, "payments", "card_payment", card_payment_flow());
    store
}

fn node(title: &str, kind: NodeKind) -> Node {
    Node {
        title: Some(title.into()),
        description: None,
        log: None,
        kind,
    }
}

fn info(next: &str) -> NodeKind {
    NodeKind::Info {
        next: Some(next.into()),
    }
}

fn choice(options: &[(&str, &str)]) -> NodeKind {
    NodeKind::Choice {
        choices: options
            .iter()
            .map(|(label, next)| Choice {
                label: (*label).into(),
                next: (*next).into(),
            })
            .collect(),
    }
}

fn input(variable: &str, next: &str) -> NodeKind {
    NodeKind::Input {
        variable: variable.into(),
        next: next.into(),
    }
}

fn resolution() -> NodeKind {
    NodeKind::Resolution { next: None }
}

pub fn sim_swap_flow() -> Graph {
    let nodes = vec![
        (
            "START",
            Node {
                description: Some("Ask why the customer needs a replacement SIM.".into()),
                log: Some("Checked reason for SIM swap".into()),
                ..node(
                    "Reason for SIM swap",
                    choice(&[("Lost or stolen", "BAR_CHECK"), ("Damaged SIM", "NEW_SIM")]),
                )
            },
        ),
        (
            "BAR_CHECK",
            Node {
                log: Some("Offered to bar lost SIM".into()),
                ..node(
                    "Does the customer want the old SIM barred?",
                    choice(&[("Yes, bar it", "NEW_SIM"), ("No", "NEW_SIM")]),
                )
            },
        ),
        (
            "NEW_SIM",
            Node {
                description: Some("Read the 19 digit number on the back of the new SIM.".into()),
                ..node("New SIM number", input("sim_number", "CONFIRM"))
            },
        ),
        (
            "CONFIRM",
            Node {
                description: Some(
                    "The swap to SIM {sim_number} will complete within 2 hours.".into(),
                ),
                log: Some("Advised swap timescale for SIM {sim_number}".into()),
                ..node("Confirm swap", info("DONE"))
            },
        ),
        ("DONE", node("SIM swap requested", resolution())),
    ];

    Graph::new(
        "START",
        nodes.into_iter().map(|(id, n)| (id.to_string(), n)),
    )
}

pub fn plan_change_flow() -> Graph {
    let nodes = vec![
        (
            "START",
            node("30 Day Plan Price", input("price", "ELIGIBLE")),
        ),
        (
            "ELIGIBLE",
            Node {
                log: Some("Checked contract eligibility".into()),
                ..node(
                    "Is the customer eligible for the £{price} plan?",
                    choice(&[("Yes", "TNC"), ("No", "NOT_ELIGIBLE")]),
                )
            },
        ),
        (
            "TNC",
            Node {
                description: Some(
                    "Your new plan costs £{price} every 30 days and renews automatically \
                     until you cancel."
                        .into(),
                ),
                ..node("Read TnC Script", info("DONE"))
            },
        ),
        ("NOT_ELIGIBLE", node("Customer not eligible for plan change", resolution())),
        ("DONE", node("Plan changed to £{price}", resolution())),
    ];

    Graph::new(
        "START",
        nodes.into_iter().map(|(id, n)| (id.to_string(), n)),
    )
}

pub fn card_payment_flow() -> Graph {
    let nodes = vec![
        ("START", node("Payment amount", input("amount", "TAKEN"))),
        (
            "TAKEN",
            Node {
                log: Some("Payment of £{amount} taken".into()),
                ..node("Was the payment successful?", choice(&[("Yes", "DONE"), ("Declined", "DONE")]))
            },
        ),
        ("DONE", node("Payment call closed", resolution())),
    ];

    Graph::new(
        "START",
        nodes.into_iter().map(|(id, n)| (id.to_string(), n)),
    )
}
