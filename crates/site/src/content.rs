//! Fixed copy shown on the public pages.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hero {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role {
    pub title: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterSection {
    pub title: &'static str,
    pub links: &'static [FooterLink],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub brand: &'static str,
    pub blurb: &'static str,
    pub sections: &'static [FooterSection],
    pub contact: Contact,
    pub copyright: &'static str,
}

pub const HERO: Hero = Hero {
    title: "Live video inspections, without the site visit",
    subtitle: "iNube LiveStream connects field agents, reviewers and customers over secure, \
               recorded live video with location tracking built in.",
    cta_label: "Sign in",
    cta_href: "/login",
};

pub const HOW_IT_WORKS: [Step; 4] = [
    Step {
        title: "Schedule a session",
        description: "An agent creates a stream and sends the customer a one-time invite link.",
    },
    Step {
        title: "Join from any device",
        description: "The customer opens the link in a browser. No app install is required.",
    },
    Step {
        title: "Stream and capture",
        description: "Participants go live while the platform records video, snapshots and location.",
    },
    Step {
        title: "Review and decide",
        description: "Reviewers replay recordings and attach findings to the case within the retention window.",
    },
];

pub const ROLES: [Role; 3] = [
    Role {
        title: "Administrator",
        description: "Owns platform policy and user access.",
        capabilities: &[
            "Configure streaming quality and session limits",
            "Set retention and security policies",
            "Manage agents and reviewers",
        ],
    },
    Role {
        title: "Field Agent",
        description: "Runs live sessions with customers.",
        capabilities: &[
            "Start and close streams",
            "Capture snapshots during a session",
            "Track participant location",
        ],
    },
    Role {
        title: "Reviewer",
        description: "Assesses recorded sessions after the fact.",
        capabilities: &[
            "Replay recordings through secure links",
            "Annotate findings",
            "Export session reports",
        ],
    },
];

pub const FOOTER: Footer = Footer {
    brand: "iNube LiveStream",
    blurb: "Secure live video for remote inspections and customer service.",
    sections: &[
        FooterSection {
            title: "Product",
            links: &[
                FooterLink { label: "How it works", href: "/#how-it-works" },
                FooterLink { label: "Roles", href: "/#roles" },
                FooterLink { label: "Sign in", href: "/login" },
            ],
        },
        FooterSection {
            title: "Company",
            links: &[
                FooterLink { label: "About iNube", href: "https://www.inubesolutions.com" },
                FooterLink { label: "Privacy", href: "/privacy" },
                FooterLink { label: "Terms", href: "/terms" },
            ],
        },
    ],
    contact: Contact {
        email: "support@inubesolutions.com",
        phone: "+91 80 4000 0000",
        address: "Bengaluru, India",
    },
    copyright: "iNube Software Solutions. All rights reserved.",
};
