//! Hand-maintained override tables for entries the heuristics mis-parse.
//!
//! Each table is an ordered slice; the first row whose key is a substring of
//! the entry text wins. Keys are exact (case-sensitive) fragments. Venues are
//! their own key.

/// Canonical title and description for a known publication or talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTitle {
    pub fragment: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Ground-truth fields for a known grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownGrant {
    pub fragment: &'static str,
    pub title: &'static str,
    pub funder: &'static str,
    pub amount: &'static str,
    /// Used only when the entry text names no collaborators.
    pub default_collaborators: &'static [&'static str],
}

pub const KNOWN_TITLES: &[KnownTitle] = &[
    KnownTitle {
        fragment: "Bayesian Hierarchical Modeling",
        title: "Bayesian Hierarchical Modeling of Large-Scale Math Tutoring Dialogues",
        description: "A statistical approach to analyzing mathematical tutoring conversations at scale, using Bayesian methods to understand patterns in student-tutor interactions.",
    },
    KnownTitle {
        fragment: "Simulated Teaching and Learning at Scale",
        title: "Simulated Teaching and Learning at Scale: Balancing Fidelity and Effectiveness in Tutoring Interactions",
        description: "Investigation of how AI-generated educational dialogues can balance realistic student behavior simulation with effective learning outcomes.",
    },
    KnownTitle {
        fragment: "Teaching and Learning in the Age of Generative AI",
        title: "Teaching and Learning in the Age of Generative AI: Understanding the Human Work of Instruction",
        description: "Analysis of the essential human elements of teaching that persist in an era of AI-assisted education.",
    },
    KnownTitle {
        fragment: "Teaching Geometry for Secondary Teachers",
        title: "Teaching Geometry for Secondary Teachers: What are the Tensions Instructors Need to Manage?",
        description: "Study of the challenges and decisions instructors face when teaching geometry to future teachers.",
    },
    KnownTitle {
        fragment: "Alumni Perspectives on General Education",
        title: "Alumni Perspectives on General Education: How Writing Can Increase What We Know",
        description: "Research on how writing assignments in general education courses contribute to long-term learning outcomes.",
    },
    KnownTitle {
        fragment: "Surveying Instructors of Geometry for Teachers Courses",
        title: "Surveying Instructors of Geometry for Teachers Courses: An Illustration of Balanced Incomplete Block Design",
        description: "Application of survey methodology to understand instructor practices in geometry education courses.",
    },
    KnownTitle {
        fragment: "How Instructors of Undergraduate Mathematics Courses Manage Tensions",
        title: "How Instructors of Undergraduate Mathematics Courses Manage Tensions Related to Teaching Courses for Teachers",
        description: "Investigation of teaching practices and decision-making in undergraduate mathematics courses designed for future teachers.",
    },
    KnownTitle {
        fragment: "Learning from Lesson Study",
        title: "Learning from Lesson Study in the College Geometry Classroom",
        description: "Analysis of the lesson study approach applied to college-level geometry instruction.",
    },
    KnownTitle {
        fragment: "Building Instructional Capacity Across Difference",
        title: "Building Instructional Capacity Across Difference: Analyzing Transdisciplinary Discourse in a Faculty Learning Community focused on Geometry for Teachers Courses",
        description: "Study of how faculty from different disciplines collaborate to improve geometry instruction for future teachers.",
    },
    KnownTitle {
        fragment: "Conceptions of the Derivative",
        title: "Conceptions of the Derivative: A Natural Language Processing Approach",
        description: "Application of NLP techniques to analyze student understanding of calculus concepts.",
    },
];

/// Longer fragments precede their prefixes so the most specific name wins.
pub const KNOWN_VENUES: &[&str] = &[
    "Joint Statistical Meetings",
    "Learning @ Scale",
    "For the Learning of Mathematics",
    "International Journal of Research in Undergraduate Mathematics Education",
    "Journal of General Education",
    "Psychology of Mathematics Education, North America Annual Conference",
    "Annual Conference on Research in Undergraduate Mathematics Education",
    "American Educational Research Association",
    "Research in Undergraduate Mathematics Education Conference",
    "Psychology of Mathematics Education, North America",
    "American Education Research Association",
    "AMTE Handbook of Mathematics Teacher Education",
    "GeT: The News!",
    "AMS Blogs: On Teaching and Learning Mathematics",
    "iRAISE Workshop at AAAI Conference",
    "Undergraduate Research Opportunity Program (UROP) Symposium",
    "Conference of the International Group for the Psychology of Mathematics Education",
    "National Council of Teachers of Mathematics",
    "Joint Mathematics Meeting",
    "Association of Mathematics Teacher Educators Annual Conference",
    "Michigan Institute for Data Science Annual Symposium",
];

pub const KNOWN_GRANTS: &[KnownGrant] = &[
    KnownGrant {
        fragment: "Instructor-centered Holistic Modeling",
        title: "Instructor-centered Holistic Modeling of Student Engagement and Progress in Data Science",
        funder: "NSF 23-624: RITEL",
        amount: "2100000",
        default_collaborators: &["K. Collins-Thompson (PI)", "C. Brooks (co-PI)", "S. Oney (co-PI)"],
    },
    KnownGrant {
        fragment: "Test Beds for Higher Education",
        title: "Test Beds for Higher Education",
        funder: "NSF 24-111: AI-Ready Test Beds",
        amount: "100000",
        default_collaborators: &["K. Collins-Thompson (PI)", "C. Brooks (co-PI)"],
    },
    KnownGrant {
        fragment: "Learning Through Technical Interviews",
        title: "Learning Through Technical Interviews: Combining Data Science Mentorship with AI-Powered Practice",
        funder: "Academic Innovation Fund",
        amount: "12435",
        default_collaborators: &["K. Collins-Thompson (co-PI)"],
    },
    KnownGrant {
        fragment: "GeT Support",
        title: "GeT Support: An online professional learning community to support the geometry course for teachers",
        funder: "NSF IUSE Grant #1725837",
        amount: "2300000",
        default_collaborators: &["P. Herbst (PI)"],
    },
];

/// First known title whose fragment occurs in `text`.
#[must_use]
pub fn find_known_title(text: &str) -> Option<&'static KnownTitle> {
    KNOWN_TITLES.iter().find(|row| text.contains(row.fragment))
}

/// First known venue name occurring verbatim in `text`.
#[must_use]
pub fn find_known_venue(text: &str) -> Option<&'static str> {
    KNOWN_VENUES.iter().copied().find(|venue| text.contains(venue))
}

/// First known grant whose fragment occurs in `text`.
#[must_use]
pub fn find_known_grant(text: &str) -> Option<&'static KnownGrant> {
    KNOWN_GRANTS.iter().find(|row| text.contains(row.fragment))
}
